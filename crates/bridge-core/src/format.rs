//! Notification templates

const FOOTER: &str = "Check it out on the source platform!";

/// Notice for a newly created thread.
///
/// The poster/content block is only included when both are known.
pub fn creation(title: &str, author: Option<&str>, content: Option<&str>) -> String {
    match (author, content) {
        (Some(author), Some(content)) => format!(
            "New item registered!\n\n{title}\nposter: {author}\n\n{content}\n\n{FOOTER}"
        ),
        _ => format!("New item registered!\n\n{title}\n\n{FOOTER}"),
    }
}

/// Notice for a thread whose closed marker was removed
pub fn reopened(title: &str) -> String {
    format!("Item reopened!\n\n{title}\n\n{FOOTER}")
}

/// Notice for a thread that gained the closed marker
pub fn closed(title: &str) -> String {
    format!("Item closed!\n\n{title}")
}
