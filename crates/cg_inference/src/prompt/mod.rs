//! Prompt assembly. Everything here is pure string work: the same inputs
//! always produce the same bytes.

use cg_core::GenerationOptions;

pub mod style;

pub use style::{style_constraint, styles, DEFAULT_STYLE};

const ARTICLE_TEMPLATE: &str = include_str!("../../templates/article_system.md");

/// Builds the system instruction for article generation. The search text is
/// embedded in full; an empty text still yields a complete instruction.
pub fn build_system_instruction(raw_data: &str, options: &GenerationOptions) -> String {
    let engine = options.engine.to_string();
    render(
        ARTICLE_TEMPLATE,
        &[
            ("audience", options.audience.as_str()),
            ("length", options.length.as_str()),
            ("style", options.style.as_str()),
            ("engine", engine.as_str()),
            ("style_constraint", style_constraint(&options.style)),
            ("raw_data", raw_data),
        ],
    )
}

/// The single user turn that accompanies the system instruction.
pub fn user_directive(keyword: &str) -> String {
    format!(
        "话题关键词：{}。请严格按风格 {{{{文章风格}}}} 和读者人群 {{{{读者人群}}}} 生成 Markdown 正文。",
        keyword
    )
}

/// System message that pins a chat session to one article.
pub fn chat_system_instruction(topic: &str, context: &str) -> String {
    format!(
        "你是\"{}\"话题的专业助手。你只能基于以下背景信息回答问题：\n{}\n严禁引入外部知识。回答需简洁。如果信息中未提及，请如实告知。",
        topic, context
    )
}

/// Replaces `${name}` slots with their values. Inserted values are not
/// scanned again and unknown slots are left as they are.
fn render(template: &str, slots: &[(&str, &str)]) -> String {
    let extra: usize = slots.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match slots.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::{Engine, Provider};

    fn options(style: &str) -> GenerationOptions {
        GenerationOptions {
            audience: "泛科技读者, 背景知识一般".to_string(),
            length: "500-800".to_string(),
            style: style.to_string(),
            engine: Engine::Tavily,
            provider: Some(Provider::OpenAI),
        }
    }

    #[test]
    fn test_instruction_is_deterministic() {
        let raw = "[Source 1]\nTitle: a\nContent: b\nURL: c";
        let first = build_system_instruction(raw, &options("深度解析"));
        let second = build_system_instruction(raw, &options("深度解析"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_slots_are_filled() {
        let instruction = build_system_instruction("RAW", &options("深度解析"));
        assert!(instruction.contains("{{读者人群}}：泛科技读者, 背景知识一般"));
        assert!(instruction.contains("{{文章长度}}：500-800"));
        assert!(instruction.contains("{{文章风格}}：深度解析"));
        assert!(instruction.contains("{{搜索引擎}}：Tavily"));
        assert!(instruction.contains(style_constraint("深度解析")));
        assert!(instruction.trim_end().ends_with("RAW"));
        assert!(!instruction.contains("${"));
    }

    #[test]
    fn test_raw_text_is_embedded_verbatim() {
        let raw = "x".repeat(100_000) + "\n${audience} stays literal";
        let instruction = build_system_instruction(&raw, &options("新闻快讯"));
        assert!(instruction.contains(&raw));
    }

    #[test]
    fn test_empty_raw_text_still_builds_with_style_block() {
        let instruction = build_system_instruction("", &options("新闻快讯"));
        assert!(!instruction.is_empty());
        assert!(instruction.contains(style_constraint("新闻快讯")));
        assert!(instruction.contains("## 抓取内容："));
    }

    #[test]
    fn test_unknown_style_uses_default_block() {
        let instruction = build_system_instruction("raw", &options("made-up-style"));
        assert!(instruction.contains(style_constraint(DEFAULT_STYLE)));
        assert!(instruction.contains("{{文章风格}}：made-up-style"));
    }

    #[test]
    fn test_user_directive_keeps_variable_references() {
        assert_eq!(
            user_directive("量子计算"),
            "话题关键词：量子计算。请严格按风格 {{文章风格}} 和读者人群 {{读者人群}} 生成 Markdown 正文。"
        );
    }

    #[test]
    fn test_chat_instruction_embeds_context() {
        let text = chat_system_instruction("量子计算", "# 文章\n正文");
        assert!(text.starts_with("你是\"量子计算\"话题的专业助手。"));
        assert!(text.contains("\n# 文章\n正文\n"));
        assert!(text.contains("严禁引入外部知识"));
    }

    #[test]
    fn test_render_leaves_unknown_and_unterminated_slots() {
        assert_eq!(render("a ${x} b ${y}", &[("x", "1")]), "a 1 b ${y}");
        assert_eq!(render("tail ${open", &[("open", "v")]), "tail ${open");
        assert_eq!(render("${x}${x}", &[("x", "${x}")]), "${x}${x}");
    }
}
