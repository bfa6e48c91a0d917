use pulldown_cmark::{html, CowStr, Event, Options, Parser};

use crate::domains::medical::EMERGENCY_CONTACTS;
use crate::domains::message::Message;

/// HTML for one chat message. Bot replies are Markdown; user text is shown
/// verbatim. The emergency-numbers marker expands to the contact list.
pub fn message_html(message: &Message) -> String {
    if message.is_emergency_numbers {
        return emergency_numbers_html();
    }
    if message.is_user() {
        return plain_text_html(&message.text);
    }
    markdown_to_html(&message.text)
}

pub fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    // Raw HTML in replies comes from third-party data; print it as text.
    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

fn plain_text_html(input: &str) -> String {
    let mut output = String::from("<p>");
    html::push_html(
        &mut output,
        std::iter::once(Event::Text(CowStr::Borrowed(input))),
    );
    output.push_str("</p>\n");
    output
}

fn emergency_numbers_html() -> String {
    let mut output = String::from("<ul class=\"emergency-numbers\">\n");
    for contact in EMERGENCY_CONTACTS.iter() {
        output.push_str(&format!(
            "<li><a href=\"tel:{number}\">{name}: {number}</a></li>\n",
            name = contact.name,
            number = contact.number
        ));
    }
    output.push_str("</ul>\n");
    output
}
