// SPDX-License-Identifier: MIT
//
// The toy shell behind n-repl.
//
// A handful of built-ins (cd, echo, help, pwd, exit/quit) and everything
// else spawned as a child process. The prompt side gets three hooks from
// here: a completer (built-ins for the first word, directory entries for
// the rest), a regex highlighter, and the multi-line rule (a trailing
// backslash continues the command on the next line).

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use n_prompt::{Document, EagerLexer, Suggestion, Token, filter};
use n_term::Color;
use regex::Regex;

/// Built-in commands and their help text.
pub const BUILTINS: &[(&str, &str)] = &[
    ("cd", "change the working directory"),
    ("echo", "print the arguments"),
    ("exit", "leave the shell"),
    ("help", "list built-in commands"),
    ("pwd", "print the working directory"),
    ("quit", "leave the shell"),
];

/// Quoted strings, `$VARS`, then any other run of non-space.
const TOKEN_PATTERN: &str = r#""[^"]*"?|'[^']*'?|\$\w+|\S+"#;

// ─── Prompt hooks ────────────────────────────────────────────────────────────

/// Suggestions for the word under the cursor.
pub fn complete(doc: &Document) -> Vec<Suggestion> {
    let word = doc.word_before_cursor();
    if is_first_word(doc.text_before_cursor()) {
        let builtins: Vec<_> = BUILTINS
            .iter()
            .map(|&(name, desc)| Suggestion::new(name, desc))
            .collect();
        return filter::has_prefix(&builtins, word, true);
    }
    filter::has_prefix(&dir_entries(Path::new(".")), word, false)
}

fn is_first_word(before_cursor: &str) -> bool {
    !before_cursor.trim_start().contains(char::is_whitespace)
}

/// Files and directories in `dir`, sorted by name. Unreadable dirs give
/// nothing.
fn dir_entries(dir: &Path) -> Vec<Suggestion> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<_> = entries
        .filter_map(Result::ok)
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let kind = if e.file_type().ok()?.is_dir() { "dir" } else { "file" };
            Some(Suggestion::new(name, kind))
        })
        .collect();
    out.sort_by(|a, b| a.text.cmp(&b.text));
    out
}

/// Highlighter for command lines.
///
/// # Errors
///
/// Only if the token pattern fails to compile.
pub fn lexer() -> Result<EagerLexer, regex::Error> {
    let re = Regex::new(TOKEN_PATTERN)?;
    Ok(EagerLexer::new(Box::new(move |input: &str| {
        tokenize(&re, input)
    })))
}

fn tokenize(re: &Regex, input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for (i, m) in re.find_iter(input).enumerate() {
        if m.start() > last {
            tokens.push(Token::new(&input[last..m.start()], Color::Default));
        }
        let color = if i == 0 {
            command_color(m.as_str())
        } else {
            argument_color(m.as_str())
        };
        tokens.push(Token::new(m.as_str(), color));
        last = m.end();
    }
    if last < input.len() {
        tokens.push(Token::new(&input[last..], Color::Default));
    }
    tokens
}

fn command_color(word: &str) -> Color {
    if BUILTINS.iter().any(|&(name, _)| name == word) {
        Color::Green
    } else {
        Color::Default
    }
}

fn argument_color(word: &str) -> Color {
    match word.as_bytes().first() {
        Some(b'"' | b'\'') => Color::Brown,
        Some(b'$') => Color::Purple,
        Some(b'-') => Color::Cyan,
        _ => Color::Default,
    }
}

/// Enter inserts a newline instead of submitting after a backslash.
pub fn is_continued(text: &str) -> bool {
    text.ends_with('\\')
}

/// `exit` or `quit`, ignoring surrounding space.
pub fn is_exit(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit")
}

/// The prompt prefix showing the current directory's name.
pub fn cwd_prefix() -> String {
    let dir = env::current_dir().ok();
    let name = dir
        .as_deref()
        .and_then(Path::file_name)
        .map_or_else(|| "/".into(), |n| n.to_string_lossy());
    format!("{name}> ")
}

// ─── Executor ────────────────────────────────────────────────────────────────

/// Run one submitted command line. Built-ins write to `out`; other commands
/// inherit the process's stdio.
///
/// # Errors
///
/// Writing to `out`, changing directory, or spawning the command failed.
pub fn execute(line: &str, out: &mut dyn Write) -> io::Result<()> {
    let words = split_words(&line.replace("\\\n", " "));
    let Some((cmd, args)) = words.split_first() else {
        return Ok(());
    };
    match cmd.as_str() {
        "cd" => {
            let home = env::var("HOME").unwrap_or_else(|_| "/".into());
            let target = args.first().map_or(home.as_str(), String::as_str);
            env::set_current_dir(target)
        }
        "echo" => writeln!(out, "{}", args.join(" ")),
        "pwd" => writeln!(out, "{}", env::current_dir()?.display()),
        "help" => {
            for (name, desc) in BUILTINS {
                writeln!(out, "  {name:<6} {desc}")?;
            }
            Ok(())
        }
        "exit" | "quit" => Ok(()),
        _ => {
            tracing::debug!(target: "shell", cmd = cmd.as_str(), args = args.len(), "spawn");
            let status = Command::new(cmd).args(args).status()?;
            if !status.success() {
                tracing::debug!(target: "shell", ?status, "command failed");
            }
            Ok(())
        }
    }
}

/// Split on whitespace, keeping quoted runs together (quotes removed).
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut quote = None;
    let mut in_word = false;
    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => word.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use n_prompt::Lexer;
    use n_prompt::units::RuneIndex;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::new(text, RuneIndex(text.chars().count()))
    }

    fn lex(input: &str) -> Vec<Token> {
        let mut lexer = lexer().unwrap();
        lexer.init(input);
        std::iter::from_fn(|| lexer.next_token()).collect()
    }

    fn run(line: &str) -> String {
        let mut out = Vec::new();
        execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    // ── Completion ──────────────────────────────────────────────────────

    #[test]
    fn completes_builtins_for_first_word() {
        let texts: Vec<_> = complete(&doc("e")).into_iter().map(|s| s.text).collect();
        assert_eq!(texts, ["echo", "exit"]);
    }

    #[test]
    fn empty_line_lists_every_builtin() {
        assert_eq!(complete(&doc("")).len(), BUILTINS.len());
    }

    #[test]
    fn first_word_detection() {
        assert!(is_first_word("  ec"));
        assert!(!is_first_word("cd "));
        assert!(!is_first_word("cd sr"));
    }

    #[test]
    fn dir_entries_are_sorted_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        assert_eq!(
            dir_entries(dir.path()),
            vec![Suggestion::new("a", "dir"), Suggestion::new("b.txt", "file")]
        );
    }

    #[test]
    fn missing_dir_has_no_entries() {
        assert!(dir_entries(Path::new("/definitely/not/here")).is_empty());
    }

    // ── Highlighting ────────────────────────────────────────────────────

    #[test]
    fn lexer_colors_words() {
        assert_eq!(
            lex("echo -n \"hi there\" $HOME"),
            vec![
                Token::new("echo", Color::Green),
                Token::new(" ", Color::Default),
                Token::new("-n", Color::Cyan),
                Token::new(" ", Color::Default),
                Token::new("\"hi there\"", Color::Brown),
                Token::new(" ", Color::Default),
                Token::new("$HOME", Color::Purple),
            ]
        );
    }

    #[test]
    fn unknown_command_is_plain() {
        assert_eq!(lex("  ls")[1], Token::new("ls", Color::Default));
    }

    #[test]
    fn lexemes_cover_input() {
        let input = "cd 'a b\\\n  x";
        let joined: String = lex(input).into_iter().map(|t| t.lexeme).collect();
        assert_eq!(joined, input);
    }

    // ── Executor ────────────────────────────────────────────────────────

    #[test]
    fn echo_joins_arguments() {
        assert_eq!(run("echo a   'b  c'"), "a b  c\n");
    }

    #[test]
    fn continued_lines_are_joined() {
        assert_eq!(run("echo one \\\ntwo"), "one two\n");
    }

    #[test]
    fn help_lists_builtins() {
        let help = run("help");
        assert!(help.contains("  cd     change the working directory\n"));
        assert_eq!(help.lines().count(), BUILTINS.len());
    }

    #[test]
    fn blank_line_does_nothing() {
        assert_eq!(run("   "), "");
    }

    #[test]
    fn missing_command_is_an_error() {
        let mut out = Vec::new();
        let err = execute("n-repl-no-such-command", &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn split_words_handles_quotes() {
        assert_eq!(split_words(r#"a "b c" d''"#), ["a", "b c", "d"]);
        assert_eq!(split_words("''"), [""]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn exit_and_continuation_rules() {
        assert!(is_exit(" quit "));
        assert!(!is_exit("exit now"));
        assert!(is_continued("ls \\"));
        assert!(!is_continued("ls"));
    }

    #[test]
    fn cwd_prefix_ends_with_marker() {
        assert!(cwd_prefix().ends_with("> "));
    }
}
