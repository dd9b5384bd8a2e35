//! End-to-end fixture scenarios: synthetic fragment documents exercising
//! the full pipeline, asserting literal expected and forbidden substrings
//! plus the universal output invariants.

use reflow::{ExtractedDocument, Fragment, Page, render_document};

fn frag(text: &str, x: f32, y: f32, font_size: f32) -> Fragment {
    Fragment {
        text: text.to_string(),
        x,
        y,
        font_size,
        width: None,
    }
}

fn frag_w(text: &str, x: f32, y: f32, font_size: f32, width: f32) -> Fragment {
    Fragment {
        text: text.to_string(),
        x,
        y,
        font_size,
        width: Some(width),
    }
}

fn page(page_index: usize, fragments: Vec<Fragment>) -> Page {
    Page {
        page_index,
        width: 612.0,
        height: 792.0,
        fragments,
    }
}

/// A run of ordinary single-column body prose establishing the body font.
fn prose_lines(top_y: f32, count: usize) -> Vec<Fragment> {
    (0..count)
        .map(|i| {
            frag(
                "ordinary body prose that flows across the page and keeps the layout engine honest",
                72.0,
                top_y - i as f32 * 14.0,
                10.0,
            )
        })
        .collect()
}

// ───────────────────────── scenario 1: title & headings ─────────────────────────

fn title_and_headings_doc() -> ExtractedDocument {
    let mut p0 = vec![
        frag("Attention Is All You Need", 160.0, 720.0, 17.0),
        // Sideways submission stamp in display type.
        frag("arXiv:1706.03762v5 [cs.CL] 6 Dec 2017", 20.0, 400.0, 17.0),
    ];
    p0.extend(prose_lines(640.0, 16));
    let mut p1 = vec![frag("1 Introduction", 72.0, 700.0, 12.0)];
    p1.extend(prose_lines(670.0, 16));
    ExtractedDocument {
        pages: vec![page(0, p0), page(1, p1)],
    }
}

#[test]
fn scenario_title_and_headings() {
    let html = render_document(&title_and_headings_doc());
    assert!(html.contains("<h1>Attention Is All You Need</h1>"), "missing title: {html}");
    assert!(html.contains("<h2>1 Introduction</h2>"), "missing section heading: {html}");
    assert!(!html.contains("<h1>arXiv"), "arXiv stamp leaked into the title: {html}");
    assert!(!html.contains("arXiv:1706.03762"), "arXiv stamp leaked into the body: {html}");
}

// ───────────────────────── scenario 2: footnote linking ─────────────────────────

fn footnote_doc() -> ExtractedDocument {
    let mut p0 = prose_lines(720.0, 10);
    // Body line carrying a superscript marker between word fragments.
    p0.push(frag_w("we also", 72.0, 430.0, 10.0, 38.0));
    p0.push(frag_w("4", 111.0, 430.9, 6.0, 3.5));
    p0.push(frag_w("hypothesize that scaling helps.", 116.0, 430.0, 10.0, 160.0));
    // Footnote at the page bottom: tiny marker fragment, then the URL.
    p0.push(frag_w("4", 72.0, 60.0, 6.0, 3.5));
    p0.push(frag("https://example.org/model-details", 78.0, 60.0, 8.5));
    ExtractedDocument {
        pages: vec![page(0, p0)],
    }
}

#[test]
fn scenario_footnote_linking() {
    let html = render_document(&footnote_doc());
    assert!(
        html.contains("<sup id=\"fnref4\"><a href=\"#fn4\" class=\"footnote-ref\">4</a></sup>"),
        "missing inline marker: {html}"
    );
    assert!(
        html.contains(
            "<p id=\"fn4\">4 <a href=\"https://example.org/model-details\">https://example.org/model-details</a></p>"
        ),
        "missing footnote entry: {html}"
    );
    assert!(html.contains("<div class=\"footnotes\">"), "missing footnotes container: {html}");
}

#[test]
fn invariant_footnote_containment_and_anchor_correspondence() {
    let html = render_document(&footnote_doc());
    // The footnote text lives in exactly one place: inside the footnotes div.
    let div_start = html.find("<div class=\"footnotes\">").expect("footnotes div");
    let first_url = html.find("https://example.org/model-details").expect("footnote url");
    assert!(first_url > div_start, "footnote text appeared in the body: {html}");
    // Marker/anchor correspondence both ways.
    assert!(html.contains("id=\"fnref4\"") && html.contains("id=\"fn4\""));
    let fnref = html.find("id=\"fnref4\"").unwrap();
    let fn_anchor = html.find("id=\"fn4\"").unwrap();
    assert!(fnref < fn_anchor, "footnote body should follow its reference");
}

// ──────────────────── scenario 3: two-column reading order ────────────────────

fn two_column_doc() -> ExtractedDocument {
    let mut p0 = Vec::new();
    let left_texts = [
        "randomized cohorts were assessed for complications over",
        "twelve months of observation in both treatment arms,",
        "contributing to worse outcomes.",
    ];
    let right_texts = [
        "embolism [PE] and deep venous thrombosis were recorded",
        "separately for every cohort in the registry, along with",
        "secondary endpoints defined by the protocol.",
    ];
    for i in 0..12 {
        let y = 700.0 - i as f32 * 14.0;
        let left = left_texts.get(i).copied().unwrap_or("left column filler prose for the layout");
        let right = right_texts.get(i).copied().unwrap_or("right column filler prose for the layout");
        p0.push(frag_w(left, 50.0, y, 10.0, 230.0));
        p0.push(frag_w(right, 320.0, y, 10.0, 230.0));
    }
    ExtractedDocument {
        pages: vec![page(0, p0)],
    }
}

#[test]
fn scenario_two_column_reading_order() {
    let html = render_document(&two_column_doc());
    let left_pos = html
        .find("contributing to worse outcomes.")
        .expect("left column sentence missing");
    let right_pos = html
        .find("embolism [PE] and deep venous thrombosis")
        .expect("right column sentence missing");
    assert!(left_pos < right_pos, "left column must precede right column: {html}");
}

#[test]
fn invariant_non_interleaving() {
    let html = render_document(&two_column_doc());
    // No right-column sentence may appear between two left-column ones.
    let l1 = html.find("randomized cohorts were assessed").unwrap();
    let l3 = html.find("contributing to worse outcomes.").unwrap();
    let r1 = html.find("embolism [PE]").unwrap();
    assert!(!(l1 < r1 && r1 < l3), "right column interleaved into left: {html}");
}

// ───────────────────────── scenario 4: hyphen soft wrap ─────────────────────────

#[test]
fn scenario_hyphen_soft_wrap() {
    let mut p0 = vec![
        frag_w("compelling sequence modeling and transduc-", 72.0, 500.0, 10.0, 330.0),
        frag_w("tion models in various tasks have emerged recently.", 72.0, 486.0, 10.0, 330.0),
    ];
    p0.extend(prose_lines(460.0, 12));
    let doc = ExtractedDocument {
        pages: vec![page(0, p0)],
    };
    let html = render_document(&doc);
    assert!(
        html.contains("sequence modeling and transduction models in various tasks"),
        "hyphen wrap not resolved: {html}"
    );
    assert!(!html.contains("transduc-"), "soft hyphen survived: {html}");
}

// ──────────────────────── scenario 5: table reconstruction ────────────────────────

fn table_doc() -> ExtractedDocument {
    let mut p0 = prose_lines(720.0, 8);
    p0.push(frag_w("Table 1: Scores on standard benchmarks.", 100.0, 560.0, 9.0, 170.0));
    // Header row.
    for (text, x) in [("Model", 100.0), ("MMLU", 220.0), ("C-Eval", 300.0), ("JMMLU", 380.0)] {
        p0.push(frag_w(text, x, 544.0, 9.0, text.chars().count() as f32 * 5.0));
    }
    // Body rows; the first label arrives as split glyphs "P" + "IQA".
    p0.push(frag_w("P", 100.0, 530.0, 9.0, 5.0));
    p0.push(frag_w("IQA", 105.5, 530.0, 9.0, 15.0));
    for (text, x) in [("60.02", 220.0), ("55.10", 300.0), ("47.30", 380.0)] {
        p0.push(frag_w(text, x, 530.0, 9.0, 25.0));
    }
    for (text, x) in [("Baseline", 100.0), ("58.11", 220.0), ("54.02", 300.0), ("44.90", 380.0)] {
        p0.push(frag_w(text, x, 516.0, 9.0, text.chars().count() as f32 * 5.0));
    }
    ExtractedDocument {
        pages: vec![page(0, p0)],
    }
}

#[test]
fn scenario_table_reconstruction() {
    let html = render_document(&table_doc());
    assert!(
        html.contains("<caption>Table 1: Scores on standard benchmarks.</caption>"),
        "missing caption: {html}"
    );
    assert!(html.contains("<table>"), "missing table: {html}");
    assert!(
        html.contains("<th>MMLU</th><th>C-Eval</th><th>JMMLU</th>"),
        "missing header cells: {html}"
    );
    assert!(html.contains("<td>60.02</td>"), "missing body cell: {html}");
    assert!(!html.contains("<td>P</td>"), "split glyph artifact leaked: {html}");
    assert!(html.contains("<td>PIQA</td>"), "glyphs not merged: {html}");
}

// ─────────────────────── scenario 6: repeated running header ───────────────────────

#[test]
fn scenario_repeated_running_header() {
    let mut pages = Vec::new();
    for p in 0..7 {
        let mut frags = prose_lines(700.0, 16);
        if p < 5 {
            frags.push(frag("JOURNAL OF LEARNING SYSTEMS", 72.0, 770.0, 8.0));
        }
        pages.push(page(p, frags));
    }
    let html = render_document(&ExtractedDocument { pages });
    assert!(
        !html.contains("JOURNAL OF LEARNING SYSTEMS"),
        "running header leaked into body: {html}"
    );
}

// ───────────────────────────── universal invariants ─────────────────────────────

#[test]
fn invariant_deterministic_output() {
    for doc in [title_and_headings_doc(), footnote_doc(), two_column_doc(), table_doc()] {
        assert_eq!(render_document(&doc), render_document(&doc));
    }
}

#[test]
fn invariant_heading_monotonicity() {
    let mut p0 = vec![frag("2 Methods", 72.0, 700.0, 12.0)];
    p0.push(frag("2.1 Study design and setting", 72.0, 660.0, 11.0));
    p0.extend(prose_lines(640.0, 4));
    p0.push(frag("2.2 Participants and cohorts", 72.0, 570.0, 11.0));
    p0.extend(prose_lines(550.0, 4));
    p0.push(frag("2.3 Statistical analysis", 72.0, 480.0, 11.0));
    p0.extend(prose_lines(460.0, 8));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    let a = html.find("<h3>2.1 Study design and setting</h3>").expect("2.1 missing");
    let b = html.find("<h3>2.2 Participants and cohorts</h3>").expect("2.2 missing");
    let c = html.find("<h3>2.3 Statistical analysis</h3>").expect("2.3 missing");
    assert!(a < b && b < c);
}

#[test]
fn invariant_page_number_sequence_never_rendered() {
    let mut pages = Vec::new();
    for p in 0..6 {
        let mut frags = prose_lines(700.0, 16);
        frags.push(frag(&(p + 1).to_string(), 300.0, 40.0, 9.0));
        pages.push(page(p, frags));
    }
    let html = render_document(&ExtractedDocument { pages });
    for p in 0..6usize {
        assert!(
            !html.contains(&format!("<p>{}</p>", p + 1)),
            "page number {} rendered as paragraph: {html}",
            p + 1
        );
    }
}

#[test]
fn invariant_paragraph_text_is_normalized() {
    // Paragraph contents are already single-spaced and trimmed: re-running
    // the assembler's normalization is a no-op.
    let html = render_document(&title_and_headings_doc());
    for chunk in html.split("<p>").skip(1) {
        let Some(end) = chunk.find("</p>") else { continue };
        let text = &chunk[..end];
        let renormalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(text, renormalized, "paragraph text not normalized");
    }
}

#[test]
fn bullets_become_an_unordered_list() {
    let mut p0 = prose_lines(720.0, 10);
    p0.push(frag("\u{2022} the first listed property of the system", 80.0, 560.0, 10.0));
    p0.push(frag("\u{2022} the second listed property of the system", 80.0, 546.0, 10.0));
    p0.push(frag("\u{2022} the third listed property of the system", 80.0, 532.0, 10.0));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(html.contains("<ul>"), "missing list: {html}");
    assert!(html.contains("<li>the first listed property of the system</li>"), "bullet glyph not stripped: {html}");
    assert!(html.matches("<li>").count() >= 3);
}

#[test]
fn numbered_source_lines_become_a_code_block() {
    let mut p0 = prose_lines(720.0, 10);
    p0.push(frag("1 def tokenize(text):", 90.0, 560.0, 9.0));
    p0.push(frag("2 return text.split()", 90.0, 548.0, 9.0));
    p0.push(frag("3 tokens = tokenize(corpus)", 90.0, 536.0, 9.0));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(
        html.contains("<pre><code>def tokenize(text):\nreturn text.split()\ntokens = tokenize(corpus)</code></pre>"),
        "code block not reconstructed: {html}"
    );
}

#[test]
fn labeled_line_splits_into_heading_and_paragraph() {
    let mut p0 = prose_lines(720.0, 10);
    p0.push(frag(
        "Limitations: our cohort is small and selection bias is possible.",
        72.0,
        560.0,
        10.0,
    ));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(html.contains("<h2>Limitations</h2>"), "label not promoted: {html}");
    assert!(
        html.contains("<p>our cohort is small and selection bias is possible.</p>"),
        "label body lost: {html}"
    );
}

#[test]
fn named_section_heading_promoted() {
    let mut p0 = vec![frag("Abstract", 72.0, 730.0, 12.0)];
    p0.extend(prose_lines(700.0, 12));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(html.contains("<h2>Abstract</h2>"), "named section missing: {html}");
}

#[test]
fn symbol_footnote_collected_without_anchor() {
    let mut p0 = prose_lines(720.0, 12);
    p0.push(frag_w("\u{2217}", 72.0, 62.0, 6.5, 4.0));
    p0.push(frag("These authors contributed equally to this work", 78.0, 60.0, 8.5));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(html.contains("<div class=\"footnotes\">"), "missing footnotes div: {html}");
    assert!(
        html.contains("\u{2217} These authors contributed equally to this work"),
        "symbol footnote lost: {html}"
    );
    // No numeric marker, so no fn-N anchor is fabricated.
    assert!(!html.contains("id=\"fn"), "spurious footnote anchor: {html}");
}

#[test]
fn figure_caption_wraps_into_one_paragraph() {
    let mut p0 = prose_lines(720.0, 10);
    p0.push(frag("Figure 2: The architecture of the", 110.0, 540.0, 9.0));
    p0.push(frag("proposed model with both stacks.", 110.0, 528.0, 9.0));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(
        html.contains("<p>Figure 2: The architecture of the proposed model with both stacks.</p>"),
        "caption not merged: {html}"
    );
}

#[test]
fn negative_coordinate_page_still_yields_title() {
    // Some extractors report negative y on the first page; the relaxed
    // title thresholds apply there.
    let mut p0 = vec![frag("A Negative Coordinate Treatise", 150.0, -20.0, 12.5)];
    for i in 0..12 {
        p0.push(frag(
            "ordinary body prose that flows across the page and keeps going",
            72.0,
            -60.0 - i as f32 * 14.0,
            10.0,
        ));
    }
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(
        html.contains("<h1>A Negative Coordinate Treatise</h1>"),
        "negative-y title missed: {html}"
    );
}

#[test]
fn references_list_with_inline_citations() {
    let mut p0 = vec![frag_w(
        "transformers outperform recurrent models [2] on many tasks and",
        72.0,
        700.0,
        10.0,
        330.0,
    )];
    p0.push(frag_w("these results were replicated independently several times.", 72.0, 686.0, 10.0, 330.0));
    p0.extend(prose_lines(660.0, 8));
    p0.push(frag("References", 72.0, 520.0, 12.0));
    p0.push(frag_w("[1] A. Author. A paper about models. 2019.", 72.0, 500.0, 9.0, 220.0));
    p0.push(frag_w("[2] B. Author. Another paper with results. 2020.", 72.0, 486.0, 9.0, 220.0));
    let html = render_document(&ExtractedDocument {
        pages: vec![page(0, p0)],
    });
    assert!(html.contains("<li id=\"ref-1\">"), "missing ref anchor: {html}");
    assert!(html.contains("<li id=\"ref-2\">"), "missing ref anchor: {html}");
    assert!(html.contains("<a href=\"#ref-2\">[2]</a>"), "inline citation not linked: {html}");
}
