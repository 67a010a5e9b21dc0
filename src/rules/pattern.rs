use regex::Regex;

/// A compiled name glob
///
/// Class patterns are matched against dotted names: `*` matches any run of
/// characters excluding the package separator, `**` matches any run
/// including it. Member patterns have no separator concept, so both
/// wildcards match any run. Literal patterns skip the regex entirely.
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal,
    Regex(Regex),
}

impl NamePattern {
    /// Compile a class-name pattern (package-separator aware)
    pub fn class_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Self::compile(pattern, "[^.]*")
    }

    /// Compile a member name or descriptor pattern
    pub fn member_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Self::compile(pattern, ".*")
    }

    fn compile(pattern: &str, single_star: &str) -> Result<Self, regex::Error> {
        if !pattern.contains('*') {
            return Ok(Self {
                raw: pattern.to_string(),
                matcher: Matcher::Literal,
            });
        }

        let mut regex = String::with_capacity(pattern.len() + 8);
        regex.push('^');
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '*' {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    regex.push_str(".*");
                } else {
                    regex.push_str(single_star);
                }
            } else {
                regex.push_str(&regex::escape(&c.to_string()));
            }
        }
        regex.push('$');

        Ok(Self {
            raw: pattern.to_string(),
            matcher: Matcher::Regex(Regex::new(&regex)?),
        })
    }

    /// Whether the pattern matches the full name
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Literal => self.raw == name,
            Matcher::Regex(re) => re.is_match(name),
        }
    }

    /// The source text of the pattern
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern matches every name (`*` or `**`)
    pub fn is_blanket(&self) -> bool {
        self.raw == "*" || self.raw == "**"
    }
}
