// src/scrape/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the tokenizer from `html5ever` (the parser underneath scraper):
// - It turns the page into a flat stream of tokens (start tag, text, ...)
// - We look at each <a> start tag exactly once, in the order it appears
// - Broken markup produces parse errors, which we skip over
//
// We deliberately don't build a DOM. A tree builder repairs bad nesting by
// cloning <a> elements, which would make one link in the source show up
// several times.
//
// Unlike a link checker, we don't clean anything up here: hrefs come back
// exactly as written, relative or not, duplicates included. A link that
// can't be fetched simply fails later, in its own fetch task.
//
// Rust concepts:
// - Traits: TokenSink is the callback the tokenizer hands tokens to
// - Pattern matching: destructuring a Token::TagToken in one go
// =============================================================================

use html5ever::local_name;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

// Collects href values as the tokenizer emits start tags
#[derive(Default)]
struct LinkSink {
    links: Vec<String>,
}

impl TokenSink for LinkSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        else {
            return TokenSinkResult::Continue;
        };

        if name == local_name!("a") {
            self.links.extend(
                attrs
                    .into_iter()
                    .filter(|attr| attr.name.local == local_name!("href"))
                    .map(|attr| attr.value.to_string()),
            );
        }

        // Without a tree builder nobody else switches the tokenizer into the
        // text-only states, so an "<a href>" inside a script isn't a link
        match &*name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        }
    }
}

// Extracts every href value from every <a> start tag, in document order
//
// Parameters:
//   html: the raw page bytes (invalid UTF-8 is replaced, not rejected)
//
// Returns: Vec<String> of raw href values
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='https://x.org'>X</a>"
//   result = ["/docs", "https://x.org"]
//
// Truncated or malformed HTML is not an error: a tag cut off at the end is
// dropped, and every link before it is returned. A repeated attribute on
// one tag is a parse error that the tokenizer resolves by keeping the first
// one, so <a href="/1" href="/2"> yields only "/1".
pub fn extract_links(html: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(html);

    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(&text));

    let mut tokenizer = Tokenizer::new(LinkSink::default(), TokenizerOpts::default());
    // With a () handle the tokenizer never pauses for scripts, so one feed
    // consumes the whole queue
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer.sink.links
}
