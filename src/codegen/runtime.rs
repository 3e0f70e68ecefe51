//! Support code emitted ahead of the translated procedure
//!
//! Only the helpers a program actually uses are emitted. Helper names start
//! with `_pli_` and never end in `_`, so no translated identifier can
//! collide with them (see [`super::python_name`]).

use crate::config::{Credentials, ENV_DB_HOST, ENV_DB_NAME, ENV_DB_PASSWORD, ENV_DB_USER};

/// Which helper groups the generated program calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeNeeds {
    /// `_pli_str`, for `||` and string built-in operands
    pub text: bool,
    pub get: bool,
    pub files: bool,
    pub sql: bool,
}

impl RuntimeNeeds {
    fn imports(&self, embedded_credentials: bool) -> Vec<&'static str> {
        let mut imports = Vec::new();
        if self.get {
            imports.push("import re");
        }
        if self.sql && !embedded_credentials {
            imports.push("import os");
        }
        if self.files || self.sql {
            imports.push("import sys");
        }
        imports
    }
}

const TEXT_HELPER: &str = "\
def _pli_str(value):
    return '' if value is None else str(value)
";

const GET_HELPER: &str = "\
def _pli_get(name):
    try:
        text = input('Enter ' + name + ': ')
    except EOFError:
        return None
    if re.fullmatch('[+-]?[0-9]+', text):
        return int(text)
    return text
";

const FILE_HELPERS: &str = "\
_pli_files = {}
_pli_eof = {}


def _pli_file_error(name, message):
    print('FILE ERROR: ' + name + ': ' + str(message), file=sys.stderr)


def _pli_open(name, mode):
    try:
        _pli_files[name] = open(name + '.txt', mode)
        _pli_eof[name] = False
    except OSError as err:
        _pli_eof[name] = True
        _pli_file_error(name, err)


def _pli_read(name):
    handle = _pli_files.get(name)
    if handle is None:
        _pli_eof[name] = True
        _pli_file_error(name, 'file is not open')
        return None
    try:
        line = handle.readline()
    except (OSError, ValueError) as err:
        _pli_eof[name] = True
        _pli_file_error(name, err)
        return None
    if line == '':
        _pli_eof[name] = True
        return None
    return line.rstrip('\\r\\n')


def _pli_write(name, value):
    handle = _pli_files.get(name)
    if handle is None:
        _pli_file_error(name, 'file is not open')
        return
    try:
        handle.write(str(value) + '\\n')
    except (OSError, ValueError) as err:
        _pli_file_error(name, err)


def _pli_close(name):
    handle = _pli_files.pop(name, None)
    if handle is None:
        _pli_file_error(name, 'file is not open')
        return
    try:
        handle.close()
    except OSError as err:
        _pli_file_error(name, err)


def _pli_endfile(name):
    return 1 if _pli_eof.get(name, False) else 0
";

const SQL_HELPER: &str = "\
def _pli_sql(query):
    try:
        import mysql.connector
    except ImportError:
        print('SQL ERROR: mysql.connector is not installed', file=sys.stderr)
        return None
    connection = None
    try:
        connection = mysql.connector.connect(**_PLI_DB)
        cursor = connection.cursor()
        cursor.execute(query)
        row = cursor.fetchone()
        cursor.close()
        return row[0] if row else None
    except mysql.connector.Error as err:
        print('SQL ERROR: SQLCODE=' + str(err.errno) + ' SQLSTATE=' + str(err.sqlstate)
              + ' MESSAGE=' + str(err.msg), file=sys.stderr)
        return None
    finally:
        if connection is not None:
            connection.close()
";

/// The `_PLI_DB` connection table: literals when credentials were supplied
/// at translation time, environment lookups otherwise
fn connection_table(credentials: Option<&Credentials>) -> String {
    let entries: [(&str, String); 4] = match credentials {
        Some(c) => [
            ("host", python_string(&c.host)),
            ("user", python_string(&c.user)),
            ("password", python_string(&c.password)),
            ("database", python_string(&c.database)),
        ],
        None => [
            ("host", env_lookup(ENV_DB_HOST)),
            ("user", env_lookup(ENV_DB_USER)),
            ("password", env_lookup(ENV_DB_PASSWORD)),
            ("database", env_lookup(ENV_DB_NAME)),
        ],
    };

    let mut table = String::from("_PLI_DB = {\n");
    for (key, value) in entries {
        table.push_str(&format!("    '{}': {},\n", key, value));
    }
    table.push_str("}\n");
    table
}

fn env_lookup(var: &str) -> String {
    format!("os.environ.get('{}', '')", var)
}

/// Helper source for `needs`, sections separated by two blank lines.
/// Empty when nothing is needed.
pub fn support_code(needs: RuntimeNeeds, credentials: Option<&Credentials>) -> String {
    let mut sections = Vec::new();

    let imports = needs.imports(credentials.is_some());
    if !imports.is_empty() {
        sections.push(imports.join("\n") + "\n");
    }
    if needs.text {
        sections.push(TEXT_HELPER.to_string());
    }
    if needs.get {
        sections.push(GET_HELPER.to_string());
    }
    if needs.files {
        sections.push(FILE_HELPERS.to_string());
    }
    if needs.sql {
        sections.push(connection_table(credentials));
        sections.push(SQL_HELPER.to_string());
    }

    sections.join("\n\n")
}

/// Render `text` as a single-quoted Python string literal
pub fn python_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_string_escapes() {
        assert_eq!(python_string("it's"), r"'it\'s'");
        assert_eq!(python_string(r"a\b"), r"'a\\b'");
        assert_eq!(python_string(""), "''");
    }

    #[test]
    fn test_nothing_needed_emits_nothing() {
        assert_eq!(support_code(RuntimeNeeds::default(), None), "");
    }

    #[test]
    fn test_only_requested_helpers() {
        let code = support_code(
            RuntimeNeeds {
                get: true,
                ..Default::default()
            },
            None,
        );
        assert!(code.starts_with("import re\n"));
        assert!(code.contains("def _pli_get(name):"));
        assert!(!code.contains("_pli_files"));
        assert!(!code.contains("import sys"));
        assert!(!code.contains("_pli_str"));
    }

    #[test]
    fn test_sql_uses_environment_without_credentials() {
        let code = support_code(
            RuntimeNeeds {
                sql: true,
                ..Default::default()
            },
            None,
        );
        assert!(code.starts_with("import os\nimport sys\n"));
        assert!(code.contains("'host': os.environ.get('PLIPY_DB_HOST', ''),"));
        assert!(code.contains("def _pli_sql(query):"));
    }

    #[test]
    fn test_sql_embeds_supplied_credentials() {
        let credentials = Credentials {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: "pa'ss".to_string(),
            database: "sakila".to_string(),
        };
        let code = support_code(
            RuntimeNeeds {
                sql: true,
                files: true,
                ..Default::default()
            },
            Some(&credentials),
        );
        assert!(code.contains(r"'password': 'pa\'ss',"));
        assert!(!code.contains("os.environ"));
        assert!(code.contains("def _pli_endfile(name):"));
    }
}
