use crate::models::{CodeLanguage, GenerationResponse};
use regex::Regex;
use std::sync::LazyLock;

// Model replies are free-form text. The chain below turns them into
// something the preview can always render, in this priority order:
//
//   1. FencedBlock      - first ``` region with an empty or recognized tag
//   2. InlineHeuristic  - the whole reply looks like component code or markup
//   3. Fallback         - fixed placeholder, so the preview is never blank
//
// First match wins. Everything here is pure and total.

/// Which rule produced the extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FencedBlock,
    InlineHeuristic,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub code: String,
    /// Language named by the fence info string, when there was one.
    pub fence_language: Option<CodeLanguage>,
    pub strategy: Strategy,
}

static MARKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)</?[a-z].*>").expect("markup regex"));

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+.*?\s+from\s+['"][^'"]*['"]\s*;?\s*\n?"#).expect("import regex")
});

static IMPORT_BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+['"][^'"]*['"]\s*;?\s*\n?"#).expect("bare import regex")
});

static EXPORT_DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*export\s+default\s+\w+\s*;?\s*\n?").expect("export regex")
});

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:export\s+)?interface\s+\w+").expect("interface regex"));

const RENDER_TAIL: &str = "\n\nconst root = ReactDOM.createRoot(document.getElementById('root'));\nroot.render(<App />);";

// Shown when no usable code could be located in a reply.
const FALLBACK_CODE: &str = r#"function App() {
  return (
    <div className="min-h-screen bg-gray-100 flex items-center justify-center p-4">
      <div className="max-w-md w-full bg-white rounded-lg shadow-lg p-6">
        <h1 className="text-2xl font-bold text-gray-800 mb-4">Nothing to preview yet</h1>
        <p className="text-gray-600 mb-4">
          The reply didn't contain any usable code. Try rephrasing your prompt
          or asking for a specific kind of application.
        </p>
      </div>
    </div>
  );
}

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);"#;

/// Runs the strategy chain over a raw reply.
pub fn extract(raw: &str) -> Extraction {
    fenced_block(raw)
        .or_else(|| inline_heuristic(raw))
        .unwrap_or_else(fallback)
}

/// Strategy 1: the first fenced block whose info string is empty or a
/// recognized language tag. Blocks tagged with some other language are
/// skipped entirely; an unclosed fence is treated as no match.
fn fenced_block(raw: &str) -> Option<Extraction> {
    let mut lines = raw.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("```") {
            continue;
        }
        let tag = trimmed.trim_start_matches('`').trim();
        let language = CodeLanguage::from_fence_tag(tag);
        let recognized = tag.is_empty() || language.is_some();

        let mut body = String::new();
        let mut closed = false;
        for inner in lines.by_ref() {
            if inner.trim_start().starts_with("```") {
                closed = true;
                break;
            }
            body.push_str(inner);
            body.push('\n');
        }
        if !closed {
            return None;
        }
        if !recognized {
            // Not a language we can preview; keep scanning for a later block.
            continue;
        }
        return Some(Extraction {
            code: body.trim().to_string(),
            fence_language: language,
            strategy: Strategy::FencedBlock,
        });
    }
    None
}

/// Strategy 2: no fence, but the reply as a whole looks like code. The
/// markers match what the system prompt asks for (a component named App)
/// plus plain markup-like syntax.
fn inline_heuristic(raw: &str) -> Option<Extraction> {
    let looks_like_component = raw.contains("function App") || raw.contains("const App");
    if looks_like_component || MARKUP_RE.is_match(raw) {
        return Some(Extraction {
            code: raw.to_string(),
            fence_language: None,
            strategy: Strategy::InlineHeuristic,
        });
    }
    None
}

/// Strategy 3: always matches.
fn fallback() -> Extraction {
    Extraction {
        code: FALLBACK_CODE.to_string(),
        fence_language: Some(CodeLanguage::Jsx),
        strategy: Strategy::Fallback,
    }
}

/// Rewrites component code so it runs in a bare browser with Babel:
/// module syntax goes away, a render call is guaranteed, and a short
/// allow-list of library component tags becomes plain styled markup.
pub fn prepare_for_browser(code: &str) -> String {
    let mut code = IMPORT_FROM_RE.replace_all(code, "").into_owned();
    code = IMPORT_BARE_RE.replace_all(&code, "").into_owned();
    code = EXPORT_DEFAULT_RE.replace_all(&code, "").into_owned();

    code = rewrite_library_components(&code);

    if !code.contains("ReactDOM.createRoot") && !code.contains("ReactDOM.render") {
        code.push_str(RENDER_TAIL);
    }
    code
}

// Models sometimes reach for shadcn-style components that don't exist in
// the frame. Swap the common ones for their plain-markup equivalents and
// let the Tailwind classes they carry do the styling.
fn rewrite_library_components(code: &str) -> String {
    static SWAPS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
        [
            (r"<Button\b", "<button"),
            (r"</Button>", "</button>"),
            (r"<Card\b", "<div"),
            (r"</Card>", "</div>"),
            (r"<Input\b", "<input"),
            (r"</Input>", "</input>"),
        ]
        .into_iter()
        .map(|(pat, rep)| (Regex::new(pat).expect("swap regex"), rep))
        .collect()
    });

    let mut out = code.to_string();
    for (re, replacement) in SWAPS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Distinguishes the typed variant by syntax markers; plain jsx when
/// ambiguous.
fn classify(code: &str) -> CodeLanguage {
    if (code.contains("React.FC") && code.contains(':')) || INTERFACE_RE.is_match(code) {
        CodeLanguage::Tsx
    } else {
        CodeLanguage::Jsx
    }
}

/// Whole pipeline: strategy chain, then language resolution and the
/// browser rewrite for component code. Documents and Vue single-file
/// components pass through untouched.
pub fn extract_response(raw: &str) -> GenerationResponse {
    let extraction = extract(raw);

    // A reply that is already a full document needs no runtime wrapper,
    // whatever the fence said.
    let is_document = extraction.code.contains("<!DOCTYPE html") || extraction.code.contains("<html");

    let (code, language) = match extraction.fence_language {
        _ if is_document => (extraction.code, CodeLanguage::Html),
        Some(CodeLanguage::Vue) => (extraction.code, CodeLanguage::Vue),
        Some(tag) if tag.is_component() => (prepare_for_browser(&extraction.code), tag),
        _ => {
            let code = prepare_for_browser(&extraction.code);
            let language = classify(&code);
            (code, language)
        }
    };

    GenerationResponse {
        code,
        language,
        file_name: language.file_name().to_string(),
    }
}

/// Fallback payload for failures upstream of extraction (endpoint down,
/// bad status, malformed body). Same guarantee: the preview is never
/// left blank.
pub fn error_fallback(message: &str) -> GenerationResponse {
    // The message lands in a JSX text position; strip anything that
    // would terminate it early.
    let safe: String = message
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | '`'))
        .collect();

    let code = format!(
        r#"function App() {{
  return (
    <div className="min-h-screen bg-gray-100 flex items-center justify-center p-4">
      <div className="max-w-md w-full bg-white rounded-lg shadow-lg p-6">
        <h1 className="text-2xl font-bold text-gray-800 mb-4">Error Generating Application</h1>
        <p className="text-gray-600 mb-4">{safe}</p>
        <div className="bg-gray-50 rounded p-4 text-sm text-gray-800">
          <p className="font-medium mb-2">Troubleshooting tips:</p>
          <ul className="list-disc pl-5 space-y-1">
            <li>Check your LLM server connection</li>
            <li>Verify your API endpoint configuration</li>
            <li>Try a simpler or more specific prompt</li>
            <li>Ensure your LLM model is properly loaded</li>
          </ul>
        </div>
      </div>
    </div>
  );
}}

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);"#
    );

    GenerationResponse {
        code,
        language: CodeLanguage::Jsx,
        file_name: CodeLanguage::Jsx.file_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "function App() {\n  const [count, setCount] = React.useState(0);\n  return (\n    <div className=\"p-4\">\n      <p>{count}</p>\n      <button onClick={() => setCount(count + 1)}>+1</button>\n    </div>\n  );\n}\n\nconst root = ReactDOM.createRoot(document.getElementById('root'));\nroot.render(<App />);";

    #[test]
    fn fenced_block_is_returned_verbatim() {
        let raw = format!("Here you go!\n\n```jsx\n{COUNTER}\n```\n\nEnjoy.");
        let extraction = extract(&raw);
        assert_eq!(extraction.strategy, Strategy::FencedBlock);
        assert_eq!(extraction.code, COUNTER);
        assert_eq!(extraction.fence_language, Some(CodeLanguage::Jsx));
    }

    #[test]
    fn counter_scenario_end_to_end() {
        let raw = format!("Sure, here's a counter app:\n```jsx\n{COUNTER}\n```");
        let response = extract_response(&raw);
        // The block already ends with a render call, so the rewrite is a no-op.
        assert_eq!(response.code, COUNTER);
        assert_eq!(response.language, CodeLanguage::Jsx);
        assert_eq!(response.file_name, "App.jsx");
    }

    #[test]
    fn untagged_fence_matches() {
        let raw = "```\nconst App = () => <div>hi</div>;\n```";
        let extraction = extract(raw);
        assert_eq!(extraction.strategy, Strategy::FencedBlock);
        assert_eq!(extraction.code, "const App = () => <div>hi</div>;");
        assert_eq!(extraction.fence_language, None);
    }

    #[test]
    fn unrecognized_fence_is_skipped_in_favor_of_a_later_one() {
        let raw = "```python\nprint(1)\n```\nbut in React:\n```jsx\nconst App = () => <p>ok</p>;\n```";
        let extraction = extract(raw);
        assert_eq!(extraction.strategy, Strategy::FencedBlock);
        assert_eq!(extraction.code, "const App = () => <p>ok</p>;");
    }

    #[test]
    fn unclosed_fence_falls_through_the_chain() {
        let raw = "```jsx\nfunction App() { return <div/>; }";
        let extraction = extract(raw);
        // The component marker still catches it, whole text unchanged.
        assert_eq!(extraction.strategy, Strategy::InlineHeuristic);
        assert_eq!(extraction.code, raw);
    }

    #[test]
    fn bare_component_reply_is_kept_whole() {
        let raw = "const App = () => {\n  return <main>hello</main>;\n};";
        let extraction = extract(raw);
        assert_eq!(extraction.strategy, Strategy::InlineHeuristic);
        assert_eq!(extraction.code, raw);
    }

    #[test]
    fn refusal_text_hits_the_fallback() {
        let extraction = extract("sorry, I cannot help");
        assert_eq!(extraction.strategy, Strategy::Fallback);
        assert!(!extraction.code.is_empty());

        let response = extract_response("sorry, I cannot help");
        assert_ne!(response.code, "sorry, I cannot help");
        assert_eq!(response.language, CodeLanguage::Jsx);
        assert_eq!(response.file_name, "App.jsx");
    }

    #[test]
    fn import_and_export_statements_are_stripped() {
        let code = "import React from 'react';\nimport './index.css';\n\nfunction App() { return <div/>; }\n\nexport default App;\n";
        let prepared = prepare_for_browser(code);
        assert!(!prepared.contains("import"));
        assert!(!prepared.contains("export default"));
        assert!(prepared.contains("function App"));
    }

    #[test]
    fn render_call_is_appended_when_missing() {
        let prepared = prepare_for_browser("function App() { return <div/>; }");
        assert!(prepared.contains("ReactDOM.createRoot(document.getElementById('root'))"));
        assert!(prepared.trim_end().ends_with("root.render(<App />);"));
    }

    #[test]
    fn existing_render_call_is_left_alone() {
        let prepared = prepare_for_browser(COUNTER);
        assert_eq!(prepared.matches("ReactDOM.createRoot").count(), 1);
    }

    #[test]
    fn library_components_become_plain_markup() {
        let code = "<Card className=\"p-2\"><Button onClick={go}>Go</Button><Input value={v} /></Card>";
        let rewritten = rewrite_library_components(code);
        assert_eq!(
            rewritten,
            "<div className=\"p-2\"><button onClick={go}>Go</button><input value={v} /></div>"
        );
    }

    #[test]
    fn typed_syntax_classifies_as_tsx() {
        let typed = "const App: React.FC = () => <div/>;";
        assert_eq!(extract_response(typed).language, CodeLanguage::Tsx);
        assert_eq!(extract_response(typed).file_name, "App.tsx");

        let iface = "interface Props { name: string }\nfunction App() { return <div/>; }";
        assert_eq!(extract_response(iface).language, CodeLanguage::Tsx);
    }

    #[test]
    fn fence_tag_wins_over_classification() {
        let raw = "```tsx\nconst App = () => <div/>;\n```";
        assert_eq!(extract_response(raw).language, CodeLanguage::Tsx);
    }

    #[test]
    fn full_document_passes_through_untouched() {
        let doc = "<!DOCTYPE html>\n<html><body><h1>hi</h1></body></html>";
        let response = extract_response(doc);
        assert_eq!(response.language, CodeLanguage::Html);
        assert_eq!(response.code, doc);
        assert_eq!(response.file_name, "app.html");
    }

    #[test]
    fn error_fallback_is_safe_and_non_empty() {
        let response = error_fallback("HTTP 500 from <server> {weird}");
        assert!(!response.code.is_empty());
        assert!(response.code.contains("HTTP 500 from server weird"));
        assert!(response.code.contains("Troubleshooting tips"));
        assert_eq!(response.language, CodeLanguage::Jsx);
    }
}
