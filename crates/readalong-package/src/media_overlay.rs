//! Media overlay manifest (§4.7, §6). A SMIL-like document listing, in
//! sentence-id order, a `<par>` per mapped sentence pointing at its text
//! span and its audio clip.
//!
//! Grounded on `examples/original_source/storyteller/synchronize/
//! epub.py::create_media_overlay`.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use readalong_align::SentenceRange;

/// Build the overlay document for one chapter. `chapter_href` and
/// `audio_dir_href` are paths relative to the overlay document's own
/// location (conventionally `MediaOverlays/<chapter>.smil`), matching the
/// `../` relative references the original emits. Each `<par>`'s `<audio>`
/// points at its own range's track under `audio_dir_href` (§6), so a
/// chapter whose ranges span more than one track still gets a correct
/// `src` per sentence.
pub fn build_media_overlay(
    overlay_id: &str,
    chapter_href: &str,
    audio_dir_href: &str,
    ranges: &[SentenceRange],
) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)));

    let mut smil = BytesStart::new("smil");
    smil.push_attribute(("xmlns", "http://www.w3.org/ns/SMIL"));
    smil.push_attribute(("xmlns:epub", "http://www.idpf.org/2007/ops"));
    smil.push_attribute(("version", "3.0"));
    let _ = writer.write_event(Event::Start(smil));

    let _ = writer.write_event(Event::Start(BytesStart::new("body")));

    let mut seq = BytesStart::new("seq");
    seq.push_attribute(("id", format!("{overlay_id}_overlay").as_str()));
    seq.push_attribute(("epub:textref", chapter_href));
    seq.push_attribute(("epub:type", "chapter"));
    let _ = writer.write_event(Event::Start(seq));

    for range in ranges {
        let par_id = format!("sentence{}", range.sentence_id);
        let mut par = BytesStart::new("par");
        par.push_attribute(("id", par_id.as_str()));
        let _ = writer.write_event(Event::Start(par));

        let mut text = BytesStart::new("text");
        let text_src = format!("{chapter_href}#sentence{}", range.sentence_id);
        text.push_attribute(("src", text_src.as_str()));
        let _ = writer.write_event(Event::Empty(text));

        let mut audio = BytesStart::new("audio");
        let audio_src = format!("{audio_dir_href}/{}", range.track);
        audio.push_attribute(("src", audio_src.as_str()));
        let clip_begin = format!("{}s", range.start_time);
        let clip_end = format!("{}s", range.end_time);
        audio.push_attribute(("clipBegin", clip_begin.as_str()));
        audio.push_attribute(("clipEnd", clip_end.as_str()));
        let _ = writer.write_event(Event::Empty(audio));

        let _ = writer.write_event(Event::End(BytesEnd::new("par")));
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("seq")));
    let _ = writer.write_event(Event::End(BytesEnd::new("body")));
    let _ = writer.write_event(Event::End(BytesEnd::new("smil")));

    String::from_utf8(writer.into_inner().into_inner()).expect("overlay xml is always valid utf-8")
}
