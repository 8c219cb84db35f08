//! End-to-end behavior of a bound region over the in-memory DOM.

use std::cell::RefCell;
use std::rc::Rc;

use normalize_editable_core::{
    Caret, EnterMode, Key, KeyEvent, KeydownResult, ManualFrames, MemoryDom, NodeId,
    NormalizeOptions, Normalizer, PlaceholderChange, RegionDom, RegionEvent, Selector, Session,
    TextCursor, Transition, UpdateTrigger,
};

const ZWSP: &str = "\u{200B}";

type TestSession = Session<MemoryDom, MemoryDom, ManualFrames>;

struct Fixture {
    dom: MemoryDom,
    region: NodeId,
    frames: ManualFrames,
    session: TestSession,
    changes: Rc<RefCell<Vec<PlaceholderChange>>>,
}

impl Fixture {
    fn new(html: &str, options: NormalizeOptions) -> Self {
        let dom = MemoryDom::new();
        let region = dom.parse_into_new("div", html).unwrap();
        let frames = ManualFrames::new();
        let session =
            Session::bind(dom.clone(), dom.clone(), region, &options, frames.clone()).unwrap();

        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = changes.clone();
        session.on_change(move |c| log.borrow_mut().push(c));

        Self {
            dom,
            region,
            frames,
            session,
            changes,
        }
    }

    fn labelled(html: &str) -> Self {
        Self::new(html, NormalizeOptions::default().with_placeholder("Type here"))
    }

    fn paragraph(&self) -> NodeId {
        self.session.with_normalizer(|n| n.block().paragraph)
    }

    fn added(&self) -> bool {
        self.session.is_placeholder_shown()
    }

    fn html(&self) -> String {
        self.dom.inner_html(&self.region)
    }

    fn press(&self, key: Key) -> KeydownResult {
        self.session.dispatch(&RegionEvent::KeyDown(KeyEvent::plain(key)))
    }

    /// A keydown the normalizer lets through, followed by the native insertion.
    fn type_char(&self, ch: &str) {
        assert_eq!(self.press(Key::character(ch)), KeydownResult::NotHandled);
        self.dom.type_text(ch).unwrap();
    }

    fn focus(&self) {
        self.session.dispatch(&RegionEvent::Focus);
        self.frames.run();
    }

    fn placeholder_blocks(&self) -> usize {
        let sel = Selector::parse(".placeholder");
        count_matching(&self.dom, &self.region, &sel)
    }
}

fn count_matching(dom: &MemoryDom, node: &NodeId, sel: &Selector) -> usize {
    dom.children(node)
        .iter()
        .map(|c| usize::from(sel.matches(dom, c)) + count_matching(dom, c, sel))
        .sum()
}

#[test]
fn empty_region_gets_placeholder_block() {
    let fx = Fixture::labelled("");
    assert!(fx.added());
    insta::assert_snapshot!(fx.html(), @r#"<div><p class="placeholder">Type here</p></div>"#);
}

#[test]
fn whitespace_leftovers_are_replaced() {
    let fx = Fixture::labelled("\n   \n");
    assert!(fx.added());
    assert_eq!(fx.dom.child_nodes(&fx.region).len(), 1);
    insta::assert_snapshot!(fx.html(), @r#"<div><p class="placeholder">Type here</p></div>"#);
}

#[test]
fn textless_elements_survive_binding() {
    let fx = Fixture::labelled(r#"<img src="x"><hr>"#);
    assert!(fx.added());
    insta::assert_snapshot!(fx.html(), @r#"<div><p class="placeholder">Type here</p></div><img src="x"><hr>"#);
}

#[test]
fn empty_paragraph_is_dressed_in_place() {
    let dom = MemoryDom::new();
    let region = dom.parse_into_new("div", "<section><p></p></section>").unwrap();
    let wrapper = dom.children(&region)[0];

    let opts = NormalizeOptions::default().with_placeholder("Type here");
    let n = Normalizer::new(dom.clone(), dom.clone(), region, &opts).unwrap();
    assert!(n.is_placeholder_shown());
    assert_eq!(n.block().wrapper, wrapper);
    insta::assert_snapshot!(dom.inner_html(&region), @r#"<section><p class="placeholder">Type here</p></section>"#);
}

#[test]
fn existing_content_is_adopted_without_mutation() {
    let dom = MemoryDom::new();
    let region = dom
        .parse_into_new("div", "<div><p>already <b>here</b></p></div>")
        .unwrap();
    let before = dom.mutation_count();

    let n = Normalizer::new(dom.clone(), dom.clone(), region, &NormalizeOptions::default()).unwrap();
    assert!(!n.is_placeholder_shown());
    assert_eq!(dom.mutation_count(), before);
    insta::assert_snapshot!(dom.inner_html(&region), @"<div><p>already <b>here</b></p></div>");
}

#[test]
fn typing_then_deleting_round_trips() {
    let fx = Fixture::new("", NormalizeOptions::default());
    assert_eq!(fx.dom.text_content(&fx.region), ZWSP);

    fx.focus();
    for ch in ["h", "e", "l", "l", "o"] {
        fx.type_char(ch);
        fx.frames.run();
        assert!(fx.placeholder_blocks() <= 1);
    }
    assert!(!fx.added());
    assert_eq!(fx.dom.text_content(&fx.region), "hello");
    assert_eq!(*fx.changes.borrow(), vec![PlaceholderChange::Hidden]);
    insta::assert_snapshot!(fx.html(), @"<div><p>hello</p></div>");

    // Native deletion empties the paragraph.
    assert_eq!(fx.press(Key::Backspace), KeydownResult::NotHandled);
    fx.dom.set_text_content(&fx.paragraph(), "").unwrap();
    fx.frames.run();

    assert!(fx.added());
    assert_eq!(fx.dom.text_content(&fx.region), ZWSP);
    assert_eq!(fx.placeholder_blocks(), 1);
    assert_eq!(
        *fx.changes.borrow(),
        vec![PlaceholderChange::Hidden, PlaceholderChange::Shown]
    );
    assert_eq!(
        fx.dom.selection().map(|s| s.focus),
        Some(Caret::new(fx.paragraph(), 0))
    );
}

#[test]
fn deleting_text_typed_after_marker_demotes() {
    let fx = Fixture::new("", NormalizeOptions::default());
    let marker = fx.dom.first_child(&fx.paragraph()).unwrap();
    fx.dom.set_caret(marker, 1);

    fx.type_char("a");
    fx.frames.run();
    assert!(!fx.added());
    assert_eq!(fx.dom.text_content(&fx.region), format!("{ZWSP}a"));

    // Only the marker is left once the "a" is deleted.
    assert_eq!(fx.press(Key::Backspace), KeydownResult::NotHandled);
    fx.dom.set_text_content(&fx.paragraph(), ZWSP).unwrap();
    assert_eq!(fx.session.flush_frame().update, Some(Transition::Demoted));

    assert!(fx.added());
    assert_eq!(fx.placeholder_blocks(), 1);
    assert_eq!(
        *fx.changes.borrow(),
        vec![PlaceholderChange::Hidden, PlaceholderChange::Shown]
    );
}

#[test]
fn evaluation_is_idempotent() {
    let dom = MemoryDom::new();
    let region = dom.element("div");
    let mut n = Normalizer::new(dom.clone(), dom.clone(), region, &NormalizeOptions::default()).unwrap();
    let paragraph = n.block().paragraph;

    dom.set_text_content(&paragraph, "x").unwrap();
    assert_eq!(n.evaluate(&UpdateTrigger::Paste), Ok(Transition::Promoted));
    let settled = dom.mutation_count();
    assert_eq!(n.evaluate(&UpdateTrigger::Paste), Ok(Transition::Unchanged));
    assert_eq!(dom.mutation_count(), settled);

    dom.set_text_content(&paragraph, "").unwrap();
    assert_eq!(n.evaluate(&UpdateTrigger::Cut), Ok(Transition::Demoted));
    let settled = dom.mutation_count();
    assert_eq!(n.evaluate(&UpdateTrigger::Cut), Ok(Transition::Unchanged));
    assert_eq!(dom.mutation_count(), settled);
}

#[test]
fn placeholder_guards_destructive_keys() {
    let fx = Fixture::labelled("");
    fx.focus();
    let before = fx.html();

    assert_eq!(fx.press(Key::Backspace), KeydownResult::Handled);
    assert_eq!(fx.press(Key::Delete), KeydownResult::Handled);
    fx.frames.run();

    assert!(fx.added());
    assert_eq!(fx.html(), before);
    assert!(fx.changes.borrow().is_empty());
}

#[test]
fn only_trailing_placeholder_is_stripped() {
    let fx = Fixture::new("", NormalizeOptions::default());
    let paragraph = fx.paragraph();
    let marker = fx.dom.child_nodes(&paragraph)[0];

    // Caret behind the placeholder: typed text follows it.
    fx.dom.set_caret(marker, 1);
    fx.type_char("a");
    fx.frames.run();

    assert!(!fx.added());
    assert_eq!(fx.dom.text_content(&paragraph), format!("{ZWSP}a"));
    assert_eq!(fx.dom.attribute(&paragraph, "class"), None);
}

#[test]
fn stray_blocks_are_swept_on_demotion() {
    let fx = Fixture::labelled("<div><p>one</p></div>");
    assert!(!fx.added());

    // Select-all + delete replaced our block with a fresh empty one.
    for child in fx.dom.child_nodes(&fx.region) {
        fx.dom.remove(&child).unwrap();
    }
    let stray = fx.dom.parse_into_new("div", "<br>").unwrap();
    fx.dom.append_child(&fx.region, &stray).unwrap();

    fx.session.dispatch(&RegionEvent::Cut);
    fx.frames.run();

    assert!(fx.added());
    assert_eq!(fx.dom.child_nodes(&fx.region).len(), 1);
    insta::assert_snapshot!(fx.html(), @r#"<div><p class="placeholder">Type here</p></div>"#);
}

#[test]
fn emptied_region_restores_single_block() {
    let fx = Fixture::labelled("<div><p>one</p></div>");
    for child in fx.dom.child_nodes(&fx.region) {
        fx.dom.remove(&child).unwrap();
    }

    fx.session
        .dispatch(&RegionEvent::KeyDown(KeyEvent::plain(Key::Backspace)));
    fx.frames.run();

    assert!(fx.added());
    assert_eq!(fx.dom.children(&fx.region), vec![fx.session.with_normalizer(|n| n.block().wrapper)]);
    assert_eq!(fx.dom.text_content(&fx.region), "Type here");
}

#[test]
fn loose_text_keeps_detached_block_until_emptied() {
    let fx = Fixture::labelled("loose text");
    assert!(!fx.added());
    insta::assert_snapshot!(fx.html(), @"loose text");

    fx.dom.set_text_content(&fx.region, "").unwrap();
    fx.session.dispatch(&RegionEvent::Paste);
    fx.frames.run();

    assert!(fx.added());
    insta::assert_snapshot!(fx.html(), @r#"<div><p class="placeholder">Type here</p></div>"#);
}

#[test]
fn burst_within_frame_evaluates_once_with_last_event() {
    let fx = Fixture::new("", NormalizeOptions::default());
    fx.focus();

    fx.type_char("a");
    fx.type_char("b");
    fx.session
        .dispatch(&RegionEvent::KeyDown(KeyEvent::plain(Key::Shift)));
    assert_eq!(fx.frames.pending(), 1);

    // The burst's last event is a bare modifier, so the lone evaluation skips.
    let report = fx.session.flush_frame();
    assert_eq!(report.update, Some(Transition::Skipped));
    assert!(fx.added());

    fx.press(Key::character("c"));
    fx.press(Key::character("d"));
    fx.press(Key::character("e"));
    assert_eq!(fx.session.flush_frame().update, Some(Transition::Promoted));
    assert_eq!(*fx.changes.borrow(), vec![PlaceholderChange::Hidden]);
}

#[test]
fn enter_splits_block_at_caret() {
    let fx = Fixture::labelled("<div><p>hello world</p></div>");
    let text = fx.dom.child_nodes(&fx.paragraph())[0];
    fx.dom.set_caret(text, 5);

    assert_eq!(fx.press(Key::Enter), KeydownResult::Handled);
    insta::assert_snapshot!(fx.html(), @"<div><p>hello</p></div><div><p> world</p></div>");

    let second = fx.dom.children(&fx.region)[1];
    let new_paragraph = fx.dom.children(&second)[0];
    assert_eq!(
        fx.dom.selection().map(|s| s.focus),
        Some(Caret::new(new_paragraph, 0))
    );
}

#[test]
fn enter_keeps_inline_formatting_and_empty_lines() {
    let fx = Fixture::labelled("<div><p>ab<b>cd</b></p></div>");
    let bold = fx.dom.children(&fx.paragraph())[0];
    let cd = fx.dom.child_nodes(&bold)[0];
    fx.dom.set_caret(cd, 1);
    fx.press(Key::Enter);
    insta::assert_snapshot!(fx.html(), @"<div><p>ab<b>c</b></p></div><div><p><b>d</b></p></div>");

    // At the very end the new line is opened with a break.
    let last = fx.dom.children(&fx.region)[1];
    let p = fx.dom.children(&last)[0];
    fx.dom.collapse_to_end(&p).unwrap();
    fx.press(Key::Enter);
    insta::assert_snapshot!(fx.html(), @"<div><p>ab<b>c</b></p></div><div><p><b>d</b></p></div><div><p><br></p></div>");
}

#[test]
fn enter_replaces_selection() {
    let fx = Fixture::labelled("<div><p>hello world</p></div>");
    let text = fx.dom.child_nodes(&fx.paragraph())[0];
    fx.dom.select(Caret::new(text, 0), Caret::new(text, 6));

    fx.press(Key::Enter);
    insta::assert_snapshot!(fx.html(), @"<div><p><br></p></div><div><p>world</p></div>");
}

#[test]
fn enter_outside_paragraph_appends_block() {
    let fx = Fixture::labelled("<div><p>a</p></div><section>loose</section>");
    let section = fx.dom.children(&fx.region)[1];
    let loose = fx.dom.child_nodes(&section)[0];
    fx.dom.set_caret(loose, 2);

    fx.press(Key::Enter);
    insta::assert_snapshot!(fx.html(), @"<div><p>a</p></div><section>loose</section><div><p><br></p></div>");

    fx.dom.clear_selection();
    fx.press(Key::Enter);
    assert_eq!(fx.dom.children(&fx.region).len(), 4);
}

#[test]
fn guard_mode_leaves_enter_to_the_browser() {
    let fx = Fixture::new(
        "<div><p>hello</p></div>",
        NormalizeOptions::default().with_enter(EnterMode::Guard),
    );
    let text = fx.dom.child_nodes(&fx.paragraph())[0];
    fx.dom.set_caret(text, 2);
    assert_eq!(fx.press(Key::Enter), KeydownResult::NotHandled);
    insta::assert_snapshot!(fx.html(), @"<div><p>hello</p></div>");
}

#[test]
fn set_placeholder_updates_visible_text_only_when_shown() {
    let fx = Fixture::labelled("");
    fx.session.set_placeholder("Say something").unwrap();
    assert_eq!(fx.dom.text_content(&fx.region), "Say something");

    fx.dom.set_text_content(&fx.paragraph(), "real").unwrap();
    fx.session.dispatch(&RegionEvent::Paste);
    fx.frames.run();
    fx.session.set_placeholder("Other").unwrap();
    assert_eq!(fx.dom.text_content(&fx.region), "real");

    fx.dom.set_text_content(&fx.paragraph(), "").unwrap();
    fx.session.dispatch(&RegionEvent::Cut);
    fx.frames.run();
    assert_eq!(fx.dom.text_content(&fx.region), "Other");
}

#[test]
fn missing_selection_only_degrades_caret() {
    let fx = Fixture::labelled("");
    fx.dom.set_selection_available(false);

    fx.dom.set_text_content(&fx.paragraph(), "typed").unwrap();
    fx.session.dispatch(&RegionEvent::Paste);
    let report = fx.session.flush_frame();

    assert_eq!(report.update, Some(Transition::Promoted));
    assert!(!fx.added());
    assert_eq!(fx.dom.selection(), None);
}

#[test]
fn unbind_stops_everything_and_keeps_dom() {
    let fx = Fixture::labelled("");
    fx.session.dispatch(&RegionEvent::Focus);
    assert!(fx.session.unbind());
    assert!(!fx.session.unbind());

    let before = fx.html();
    assert_eq!(fx.press(Key::Backspace), KeydownResult::NotHandled);
    fx.dom.set_text_content(&fx.paragraph(), "after").unwrap();
    fx.frames.run();
    fx.session.flush_frame();

    assert!(fx.added());
    assert_ne!(fx.html(), before);
    assert!(fx.changes.borrow().is_empty());
    assert_eq!(fx.dom.selection(), None);
}
