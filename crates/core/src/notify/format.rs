//! Message formatting for notifications.

use crate::share::FileRecord;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Image types sent through the photo delivery path.
const PHOTO_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Marker shown when a record has no description.
const NO_DESCRIPTION: &str = "none";

/// Render a byte count with binary units.
///
/// Bytes are printed as-is; KB, MB and GB are rounded half-up to two
/// decimals using integer arithmetic.
#[must_use]
pub fn format_file_size(size: u64) -> String {
    let (unit, name) = match size {
        s if s >= GB => (GB, "GB"),
        s if s >= MB => (MB, "MB"),
        s if s >= KB => (KB, "KB"),
        _ => return format!("{size} B"),
    };

    let unit = u128::from(unit);
    let hundredths = (u128::from(size) * 100 + unit / 2) / unit;
    format!("{}.{:02} {name}", hundredths / 100, hundredths % 100)
}

/// Check whether a MIME type goes through the photo delivery path.
#[must_use]
pub fn is_photo(content_type: &str) -> bool {
    PHOTO_TYPES.contains(&content_type)
}

/// Escape characters with meaning in Telegram's legacy Markdown.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Text inside a Markdown code span cannot contain backticks.
fn code_span(text: &str) -> String {
    text.replace('`', "'")
}

fn size_of(record: &FileRecord) -> String {
    format_file_size(u64::try_from(record.size).unwrap_or(0))
}

/// Markdown message for a text-only notification.
#[must_use]
pub fn text_message(record: &FileRecord, share_url: &str) -> String {
    let description = record
        .description
        .as_deref()
        .map_or_else(|| NO_DESCRIPTION.to_string(), escape_markdown);

    format!(
        "📁 *New file shared*\n\n\
         📄 Name: `{}`\n\
         📊 Type: `{}`\n\
         📦 Size: `{}`\n\
         📝 Description: {}\n\n\
         🔗 [Open]({})",
        code_span(&record.filename),
        code_span(&record.content_type),
        size_of(record),
        description,
        share_url,
    )
}

/// Plain-text caption for an attachment notification.
#[must_use]
pub fn attachment_caption(record: &FileRecord, share_url: &str) -> String {
    format!(
        "📁 {}\n📊 {} | 📦 {}\n📝 {}\n🔗 {}",
        record.filename,
        record.content_type,
        size_of(record),
        record.description.as_deref().unwrap_or(NO_DESCRIPTION),
        share_url,
    )
}
