//! `<meta name="go-import">` discovery
//!
//! Only the document head is scanned; scanning stops at `</head>` or `<body>`.

/// One `go-import` declaration: `content="<prefix> <vcs> <repo>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaImport {
    pub prefix: String,
    pub vcs: String,
    pub repo: String,
}

/// Extracts every well-formed `go-import` meta tag from `html`.
///
/// Tags whose content does not have exactly three fields are ignored.
pub fn parse_meta_go_imports(html: &str) -> Vec<MetaImport> {
    // ASCII lowercasing keeps byte offsets aligned with `html`
    let lower = html.to_ascii_lowercase();
    let head_end = ["</head", "<body"]
        .iter()
        .filter_map(|marker| lower.find(marker))
        .min()
        .unwrap_or(lower.len());

    let mut imports = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = lower[cursor..head_end].find("<meta") {
        let start = cursor + offset + "<meta".len();
        let Some(len) = tag_len(&html[start..head_end]) else {
            break;
        };
        let attrs = parse_attributes(&html[start..start + len]);
        cursor = start + len;

        let is_go_import = attrs
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("name") && v == "go-import");
        if !is_go_import {
            continue;
        }
        let Some((_, content)) = attrs.iter().find(|(k, _)| k.eq_ignore_ascii_case("content"))
        else {
            continue;
        };

        let fields: Vec<&str> = content.split_whitespace().collect();
        if let [prefix, vcs, repo] = fields.as_slice() {
            imports.push(MetaImport {
                prefix: prefix.to_string(),
                vcs: vcs.to_string(),
                repo: repo.to_string(),
            });
        }
    }

    imports
}

/// Returns the imports whose prefix covers `import_path` at a `/` boundary
pub fn matching<'a>(imports: &'a [MetaImport], import_path: &str) -> Vec<&'a MetaImport> {
    imports
        .iter()
        .filter(|m| {
            import_path
                .strip_prefix(m.prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .collect()
}

/// Byte length of a tag body up to (not including) its closing `>`
fn tag_len(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attributes(body: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = body.trim_end_matches('/').chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=') {
            name.push(c);
        }
        if name.is_empty() {
            break;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next_if_eq(&'=').is_none() {
            attrs.push((name, String::new()));
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        match chars.next_if(|c| *c == '"' || *c == '\'') {
            Some(quote) => {
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            None => {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
            }
        }
        attrs.push((name, value));
    }

    attrs
}
