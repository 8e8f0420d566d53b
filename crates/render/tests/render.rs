use kyozai_core::{ExamDocument, WorksheetDocument, escape_text_field};
use kyozai_render::{
    RenderOptions, check_api_health, generate_exam_html, generate_exam_html_with_options,
    generate_lesson_plan_docx, generate_lesson_plan_html, generate_worksheet_html,
};
use std::io::Read;

const EXAM: &str = r#"
試験名: 前期中間考査
サブタイトル: 数学I
学校名: 県立第一高校
科目: 数学
試験時間: 50
注意事項:
  - 解答はすべて解答用紙に記入すること
大問:
  - タイトル: 二次関数
    必須: true
    配点: 30
    小問:
      - 本文: '次の式を展開せよ。$(x+1)^2$'
        解答: '$x^2+2x+1$'
        解説: 公式を使う。
      - 因数分解せよ。
  - タイトル: 選択問題
    区分: 選択A
    問題:
      - 番号: ア
        本文: 証明せよ。
"#;

const WORKSHEET: &str = r#"
タイトル: 一次方程式
サブタイトル: 練習
問題:
  - type: header
    text: 基本
  - 本文: '次の方程式を解け。\n- $2x = 4$\n- $3x = 9$'
    解答: ['x = 2', 'x = 3', 'x = 4']
  - 本文: 文章題
    解答: '12'
    配点: 5
  - 本文: 自由記述
"#;

const LESSON_PLAN: &str = r#"
教科: 数学
日時: 令和6年6月10日
学校名: 県立第一高校
対象: 1年A組
会場: 1年A組教室
授業者: 山田
単元名: 二次関数
本時の目標:
  - グラフの平行移動を理解する
展開:
  導入:
    時間: 10
    学習内容: [前時の復習]
    留意点: [既習事項を確認する]
  まとめ:
    学習活動: [振り返りを書く]
評価:
  知識・技能: 平行移動を説明できる
板書計画: |
  y = a(x - p)^2 + q
  頂点 (p, q)
"#;

fn ok_html(response: kyozai_render::GenerateResponse) -> String {
    assert!(response.success, "{:?}", response.error);
    response.html
}

fn notices(count: usize) -> String {
    let mut src = String::from("注意事項:\n");
    for i in 0..count {
        src.push_str(&format!("  - 注意{i}\n"));
    }
    src
}

#[test]
fn every_entry_point_is_deterministic() {
    assert_eq!(
        ok_html(generate_exam_html(EXAM)),
        ok_html(generate_exam_html(EXAM))
    );
    assert_eq!(
        ok_html(generate_worksheet_html(WORKSHEET)),
        ok_html(generate_worksheet_html(WORKSHEET))
    );
    assert_eq!(
        ok_html(generate_lesson_plan_html(LESSON_PLAN)),
        ok_html(generate_lesson_plan_html(LESSON_PLAN))
    );
    assert_eq!(
        generate_lesson_plan_docx(LESSON_PLAN).docx,
        generate_lesson_plan_docx(LESSON_PLAN).docx
    );
}

#[test]
fn exam_title_alias_and_cover() {
    let html = ok_html(generate_exam_html(EXAM));
    assert!(html.contains("<title>前期中間考査</title>"));
    assert!(html.contains("<h1 class=\"exam-title\">前期中間考査</h1>"));
    assert!(html.contains("<div class=\"exam-subtitle\">数学I</div>"));
    assert!(html.contains("試験時間：</strong> 50分"));
    assert!(!html.contains("配点：</strong>"));
}

#[test]
fn primary_title_key_wins_over_alias() {
    let html = ok_html(generate_exam_html("タイトル: 本命\n試験名: 別名\n"));
    assert!(html.contains("<h1 class=\"exam-title\">本命</h1>"));
    assert!(!html.contains("別名"));
}

#[test]
fn exam_labels_badges_and_answers() {
    let html = ok_html(generate_exam_html(EXAM));
    assert!(html.contains("1. 二次関数"));
    assert!(html.contains("<span class=\"problem-type\">必答</span>"));
    assert!(html.contains("<span class=\"problem-type\">選択A</span>"));
    assert!(html.contains("（配点 30点）"));
    assert!(html.contains("<div class=\"problem-item-num\">(1)</div>"));
    assert!(html.contains("<div class=\"problem-item-num\">(2)</div>"));
    assert!(html.contains("<div class=\"problem-item-num\">ア</div>"));
    assert!(html.contains("（解答なし）"));
    assert_eq!(html.matches("【解説】").count(), 1);
}

#[test]
fn exam_math_spans_survive() {
    let html = ok_html(generate_exam_html(EXAM));
    assert!(html.contains("$(x+1)^2$"));
    assert!(html.contains("$x^2+2x+1$"));
    assert!(html.contains("MathJax"));
}

#[test]
fn notice_presets_follow_count() {
    for (count, preset) in [
        (5, "largest"),
        (6, "medium"),
        (7, "medium"),
        (8, "small"),
        (9, "small"),
        (10, "smallest"),
        (12, "smallest"),
    ] {
        let html = ok_html(generate_exam_html(&notices(count)));
        assert!(
            html.contains(&format!("notices-{preset}\"")),
            "{count} notices should use {preset}"
        );
    }
}

#[test]
fn no_notices_no_box() {
    let html = ok_html(generate_exam_html("タイトル: t\n"));
    assert!(!html.contains("class=\"exam-notes"));
}

#[test]
fn worksheet_list_after_line_and_answers() {
    let html = ok_html(generate_worksheet_html(WORKSHEET));
    assert!(html.contains("<p>次の方程式を解け。</p>"), "{html}");
    assert!(html.contains("<li>$2x = 4$</li>"), "{html}");
    assert!(html.contains("<div class=\"section-header\">基本</div>"));
    assert!(html.contains("〜 練習 〜"));
    assert_eq!(html.matches("答: ").count(), 4);
    assert!(html.contains("[5点]"));
}

#[test]
fn worksheet_numbers_skip_headers() {
    let html = ok_html(generate_worksheet_html(WORKSHEET));
    assert!(html.contains("<span class=\"problem-number\">1</span>"));
    assert!(html.contains("<span class=\"problem-number\">3</span>"));
    assert!(!html.contains("<span class=\"problem-number\">4</span>"));
}

#[test]
fn worksheet_answer_key_can_be_disabled() {
    let html = ok_html(generate_worksheet_html(&format!("解答を作成: false\n{WORKSHEET}")));
    assert!(!html.contains("class=\"answer-page\""));
    assert!(!html.contains("答: "));
}

#[test]
fn lesson_plan_sections_are_numbered_sequentially() {
    let html = ok_html(generate_lesson_plan_html(LESSON_PLAN));
    assert!(html.contains("<h1>数学科 学習指導案</h1>"));
    let headings: Vec<_> = html
        .match_indices("<h2>")
        .map(|(i, _)| {
            let rest = &html[i + 4..];
            &rest[..rest.find("</h2>").unwrap()]
        })
        .collect();
    assert_eq!(
        headings,
        vec![
            "１　単元名",
            "２　本時の目標",
            "３　本時の展開",
            "４　本時の評価",
            "５　板書計画"
        ]
    );
    assert!(html.contains("<tr><td>導入<br>(10分)</td>"));
    assert!(html.contains("<strong>知識・技能：</strong>平行移動を説明できる"));
}

#[test]
fn empty_lesson_plan_omits_sections_in_both_outputs() {
    let html = ok_html(generate_lesson_plan_html("教科: 国語\n"));
    assert!(!html.contains("<h2>"));

    let docx = generate_lesson_plan_docx("教科: 国語\n");
    assert!(docx.success);
    let document = docx_document_xml(&docx.docx);
    assert!(!document.contains("Heading1"));
    assert!(document.contains("国語科 学習指導案"));
}

#[test]
fn docx_matches_html_sections() {
    let response = generate_lesson_plan_docx(LESSON_PLAN);
    assert!(response.success, "{:?}", response.error);
    assert!(response.docx.starts_with(b"PK"));
    let document = docx_document_xml(&response.docx);
    for heading in ["１　単元名", "３　本時の展開", "５　板書計画"] {
        assert!(document.contains(heading), "missing {heading}");
    }
    assert!(document.contains("頂点 (p, q)"));
}

#[test]
fn reference_links_keep_their_text() {
    let src = "大問:\n  - 小問:\n      - 本文: '詳しくは[教科書][1]を参照。\\n\\n[1]: https://example.com'\n";
    let html = ok_html(generate_exam_html(src));
    assert!(
        html.contains("<a href=\"https://example.com\">教科書</a>"),
        "{html}"
    );
}

#[test]
fn docx_drops_characters_illegal_in_xml() {
    let response = generate_lesson_plan_docx("教科: \"数\\x01学\"\n単元名: \"関\\x1F数\"\n");
    assert!(response.success, "{:?}", response.error);
    let document = docx_document_xml(&response.docx);
    assert!(!document.contains(['\u{1}', '\u{1f}']));
    assert!(document.contains("数学科 学習指導案"));
    assert!(document.contains("関数"));
}

#[test]
fn escaped_fields_survive_write_back() {
    let body = "式 \"a\\b\"\n次の行\u{7}\u{85}";
    let src = format!("問題:\n  - 本文: \"{}\"\n", escape_text_field(body));
    let sheet = WorksheetDocument::parse(&src).unwrap();
    assert_eq!(sheet.problems().next().unwrap().body, body);
    assert_eq!(WorksheetDocument::parse(&sheet.to_source()).unwrap(), sheet);

    let exam = ExamDocument::parse(EXAM).unwrap();
    assert_eq!(ExamDocument::parse(&exam.to_source()).unwrap(), exam);
}

#[test]
fn malformed_input_is_contained_everywhere() {
    let bad = "タイトル: [\n";
    for response in [
        generate_exam_html(bad),
        generate_worksheet_html(bad),
        generate_lesson_plan_html(bad),
    ] {
        assert!(!response.success);
        assert!(response.html.is_empty());
        assert!(response.error.is_some());
    }
    let docx = generate_lesson_plan_docx(bad);
    assert!(!docx.success);
    assert!(docx.docx_base64.is_empty());
    assert!(check_api_health());
}

#[test]
fn options_strip_mathjax_and_preview() {
    let options = RenderOptions {
        include_mathjax: false,
        allow_raw_html: false,
        page_break_preview: false,
    };
    let html = ok_html(generate_exam_html_with_options(EXAM, &options));
    assert!(!html.contains("MathJax"));
    assert!(!html.contains("改ページ"));
}

fn docx_document_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    document
}
