use crate::error::PreviewError;
use crate::models::CodeLanguage;

// The synthesized document the iframe runs. The webview injects it via
// `srcdoc` into a frame sandboxed with `allow-scripts allow-forms` (no
// same-origin access), which is the entire isolation boundary for
// generated code. Placeholders are substituted with `str::replace`, so
// the template stays readable.
const COMPONENT_DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>App Preview</title>
    <!-- React dependencies -->
    <script src="https://unpkg.com/react@18/umd/react.development.js"></script>
    <script src="https://unpkg.com/react-dom@18/umd/react-dom.development.js"></script>
    <!-- Babel for JSX -->
    <script src="https://unpkg.com/@babel/standalone/babel.min.js"></script>
    <!-- TailwindCSS CDN -->
    <script src="https://cdn.tailwindcss.com"></script>
    <script>
      tailwind.config = {
        darkMode: 'class',
        theme: {
          extend: {
            colors: {
              primary: '#9b87f5',
              secondary: '#7E69AB',
              background: '#f8fafc',
              foreground: '#1f2937',
              muted: '#f1f5f9',
              'muted-foreground': '#64748b',
              border: '#e2e8f0',
              input: '#e2e8f0',
              card: '#ffffff',
              'card-foreground': '#1f2937',
            }
          }
        },
        plugins: [
          function({ addComponents }) {
            addComponents({
              '.card': {
                backgroundColor: '#ffffff',
                borderRadius: '0.5rem',
                padding: '1.5rem',
                boxShadow: '0 4px 6px -1px rgba(0, 0, 0, 0.1), 0 2px 4px -1px rgba(0, 0, 0, 0.06)',
              },
              '.btn': {
                padding: '0.5rem 1rem',
                borderRadius: '0.25rem',
                fontWeight: '600',
                cursor: 'pointer',
                display: 'inline-flex',
                alignItems: 'center',
                justifyContent: 'center',
              },
              '.btn-primary': {
                backgroundColor: '#9b87f5',
                color: '#ffffff',
                '&:hover': {
                  backgroundColor: '#7E69AB',
                },
              },
            })
          }
        ]
      }
    </script>
    <style>
      body {
        font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
        line-height: 1.6;
        color: #333;
        margin: 0;
        padding: 0;
      }
      #root {
        width: 100%;
      }
    </style>
</head>
<body>
    <div id="root"></div>
    <!-- Anything thrown while mounting lands here as an inline banner
         instead of leaving the frame blank -->
    <script>
      window.addEventListener('error', function (event) {
        var root = document.getElementById('root');
        if (root) {
          root.innerHTML = '<div style="color: #b91c1c; padding: 20px; font-family: sans-serif;">' +
            'Error rendering the component: ' + (event.message || 'unknown error') + '</div>';
        }
      });
    </script>
    <!-- Generated component -->
    <script type="text/babel">
__APP_CODE__

      if (typeof App === 'undefined') {
        throw new Error("No component named 'App' was found in the generated code.");
      }
    </script>
</body>
</html>
"#;

const ERROR_DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Preview Error</title>
</head>
<body style="margin: 0; font-family: sans-serif;">
    <div style="color: #b91c1c; padding: 20px;">__MESSAGE__</div>
</body>
</html>
"#;

/// Builds the document the preview frame displays.
///
/// Code that already carries a full document wrapper is passed through
/// unmodified; html fragments likewise (browsers render them as-is).
/// Component code gets the CDN runtime wrapper. A language the frame has
/// no runtime for is a typed error the caller turns into an inline banner.
pub fn build_preview_document(code: &str, language: CodeLanguage) -> Result<String, PreviewError> {
    if code.contains("<!DOCTYPE html") || code.contains("<html") {
        return Ok(code.to_string());
    }
    match language {
        CodeLanguage::Html => Ok(code.to_string()),
        lang if lang.is_component() => Ok(wrap_component_document(code)),
        other => Err(PreviewError::UnsupportedLanguage(other)),
    }
}

fn wrap_component_document(code: &str) -> String {
    // A literal </script> inside the generated code would terminate the
    // babel block and truncate the document.
    let escaped = code.replace("</script", "<\\/script");
    COMPONENT_DOCUMENT_TEMPLATE.replace("__APP_CODE__", &escaped)
}

/// Minimal document carrying an inline error banner, used when the
/// preview cannot be constructed at all.
pub fn error_document(message: &str) -> String {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    ERROR_DOCUMENT_TEMPLATE.replace("__MESSAGE__", &escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_document_passes_through() {
        let doc = "<!DOCTYPE html>\n<html><body>hi</body></html>";
        let out = build_preview_document(doc, CodeLanguage::Html).unwrap();
        assert_eq!(out, doc);

        // Even when mis-tagged as a component language.
        let out = build_preview_document(doc, CodeLanguage::Jsx).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn html_fragment_passes_through() {
        let fragment = "<h1>hello</h1>";
        let out = build_preview_document(fragment, CodeLanguage::Html).unwrap();
        assert_eq!(out, fragment);
    }

    #[test]
    fn component_code_gets_the_runtime_wrapper() {
        let code = "function App() { return <div>hi</div>; }";
        let doc = build_preview_document(code, CodeLanguage::Jsx).unwrap();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("react-dom@18"));
        assert!(doc.contains("babel/standalone") || doc.contains("@babel/standalone"));
        assert!(doc.contains("cdn.tailwindcss.com"));
        assert!(doc.contains(code));
        assert!(doc.contains("id=\"root\""));
        assert!(doc.contains("No component named 'App'"));
    }

    #[test]
    fn script_terminators_in_code_are_escaped() {
        let code = "const App = () => <div>{\"</script>\"}</div>;";
        let doc = build_preview_document(code, CodeLanguage::Jsx).unwrap();
        assert!(!doc.contains("{\"</script>\"}"));
        assert!(doc.contains("<\\/script"));
    }

    #[test]
    fn vue_without_a_document_is_a_typed_error() {
        let err = build_preview_document("<template></template>", CodeLanguage::Vue);
        assert!(matches!(
            err,
            Err(PreviewError::UnsupportedLanguage(CodeLanguage::Vue))
        ));
    }

    #[test]
    fn error_document_escapes_markup() {
        let doc = error_document("No preview runtime for <Vue> code");
        assert!(doc.contains("&lt;Vue&gt;"));
        assert!(!doc.contains("<Vue>"));
    }
}
