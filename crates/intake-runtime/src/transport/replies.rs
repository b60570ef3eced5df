//! Fixed command replies.

pub const INFO_TEXT: &str = "\
This service collects registrable domains submitted by its users.

Every link or host name you send is reduced to its apex zone \
(for example, https://news.sub.example.ir/a becomes example.ir) and \
stored once. The first submission of a zone is confirmed with a reply; \
repeats are accepted silently.";

pub const HELP_TEXT: &str = "\
Send a link or a host name, one per message:

  https://www.example.ir/page
  shop.example.com

Commands:
  /start  version and build information
  /info   what this service does
  /help   this message

Each sender may submit a limited number of messages per day.";

/// Build time stamped by the release pipeline, if any.
pub const BUILD_TIME: &str = match option_env!("DI_BUILD_TIME") {
    Some(time) => time,
    None => "unknown",
};

pub fn start_text() -> String {
    format!(
        "Compiled At: `{}`\nVersion: `{}`",
        BUILD_TIME,
        env!("CARGO_PKG_VERSION")
    )
}
