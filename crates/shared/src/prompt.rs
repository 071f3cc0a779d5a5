/// Render the per-section summarization prompt.
///
/// Inputs are interpolated as-is in a single pass, so text that looks like a
/// placeholder in one argument is never expanded by another.
pub fn build_prompt(paper_title: &str, section_title: &str, section_text: &str) -> String {
    format!(
        r#"英語の研究論文の一部を日本語で要約するタスクを行います。
これは「{paper_title}」というタイトルの論文の「{section_title}」というセクションの文章です。
以下のルールに従ってください。

・リスト形式で出力する (先頭は - を使う)
・タブによるインデントを使って論理的な構造を表現する
・不明な単語や人名，専門用語と思われるものは英語のまま表示する
・最後に文章に含まれる重要な数式を日本語で丁寧にリスト形式で説明する
・タブでインデントした後に数式に現れる記号や変数の意味を説明する
・数式はmarkdown形式で記述し，$で括る

それでは開始します。

英語の論文の一部:
{section_text}

日本語で要約した文章:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_all_inputs() {
        let prompt = build_prompt("Example Paper", "Introduction", "A study of X.");
        assert!(prompt.contains("「Example Paper」"));
        assert!(prompt.contains("「Introduction」"));
        assert!(prompt.contains("英語の論文の一部:\nA study of X.\n"));
        assert!(prompt.ends_with("日本語で要約した文章:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("P", "S", "text");
        let b = build_prompt("P", "S", "text");
        assert_eq!(a, b);
    }

    #[test]
    fn test_placeholder_text_is_not_expanded() {
        let prompt = build_prompt("{section_text}", "{paper_title}", "$E = mc^2$ and {braces}");
        assert!(prompt.contains("「{section_text}」"));
        assert!(prompt.contains("「{paper_title}」"));
        assert!(prompt.contains("$E = mc^2$ and {braces}"));
    }

    #[test]
    fn test_prompt_keeps_format_rules() {
        let prompt = build_prompt("P", "S", "T");
        assert!(prompt.contains("リスト形式で出力する (先頭は - を使う)"));
        assert!(prompt.contains("数式はmarkdown形式で記述し，$で括る"));
    }
}
