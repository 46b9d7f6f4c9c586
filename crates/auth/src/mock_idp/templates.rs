//! HTML templates for the Mock IdP pages.

/// Escape HTML special characters to prevent XSS.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, sans-serif;
            max-width: 400px;
            margin: 100px auto;
            padding: 20px;
        }
        .warning {
            background: #fff3cd;
            border: 1px solid #ffc107;
            padding: 15px;
            border-radius: 8px;
            margin-bottom: 20px;
        }
        form {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
        }
        label {
            display: block;
            margin-bottom: 5px;
        }
        input {
            width: 100%;
            padding: 10px;
            margin-bottom: 15px;
            box-sizing: border-box;
        }
        button {
            width: 100%;
            padding: 12px;
            background: #6363f1;
            color: white;
            border: none;
            border-radius: 4px;
        }
"#;

/// Sign-in page standing in for the hosted AuthKit page.
pub fn login_page(state: &str, redirect_uri: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock AuthKit Sign In (DEV ONLY)</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="warning">
        <p>This is a <strong>mock sign-in page</strong> for development purposes.</p>
        <p>Enter any email address to simulate authentication.</p>
    </div>

    <form action="/authorize/submit" method="POST">
        <input type="hidden" name="state" value="{state}" />
        <input type="hidden" name="redirect_uri" value="{redirect_uri}" />

        <label for="email">Email Address</label>
        <input type="email" id="email" name="email" placeholder="dev@example.com" required />

        <label for="first_name">First name (optional)</label>
        <input type="text" id="first_name" name="first_name" />

        <label for="last_name">Last name (optional)</label>
        <input type="text" id="last_name" name="last_name" />

        <button type="submit">Sign in</button>
    </form>
</body>
</html>"#,
        state = html_escape(state),
        redirect_uri = html_escape(redirect_uri),
    )
}

/// Page shown after the provider-side logout.
pub fn signed_out_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Signed out (DEV ONLY)</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="warning">
        <p>The mock session has ended.</p>
    </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_escapes_values() {
        let html = login_page("\"><script>", "http://localhost/cb");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
