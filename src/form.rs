//! Submitted form data and uploaded files.

use std::convert::Infallible;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::Error;

/// Fields and files from a submitted form, in submission order.
#[derive(Debug, Default)]
pub struct Form {
    fields: Vec<(String, String)>,
    files: Vec<FileStorage>,
}

impl Form {
    pub(crate) fn from_urlencoded(body: &[u8]) -> Self {
        Self {
            fields: form_urlencoded::parse(body).into_owned().collect(),
            files: Vec::new(),
        }
    }

    pub(crate) async fn from_multipart(body: Bytes, boundary: String) -> Result<Self, Error> {
        let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            let filename = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await?;

            match filename {
                Some(filename) => {
                    debug!(field = %name, filename = %filename, size = data.len(), "received upload");
                    form.files.push(FileStorage { name, filename: Some(filename), content_type, data });
                }
                None => form.fields.push((name, String::from_utf8_lossy(&data).into_owned())),
            }
        }

        Ok(form)
    }

    /// The first value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Like [`get`](Form::get), but a missing field is a `400 Bad Request`.
    pub fn require(&self, name: &str) -> Result<&str, Error> {
        self.get(name).ok_or_else(|| Error::MissingField(name.to_owned()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The first file uploaded through the input named `name`.
    pub fn file(&self, name: &str) -> Option<&FileStorage> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Like [`file`](Form::file), but a missing file is a `400 Bad Request`.
    pub fn require_file(&self, name: &str) -> Result<&FileStorage, Error> {
        self.file(name).ok_or_else(|| Error::MissingFile(name.to_owned()))
    }
}

/// One uploaded file, held in memory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl FileStorage {
    /// The form input the file came from.
    pub fn name(&self) -> &str { &self.name }

    /// The filename the client claimed. Untrusted; see [`secure_filename`].
    pub fn filename(&self) -> Option<&str> { self.filename.as_deref() }

    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }
    pub fn data(&self) -> &[u8] { &self.data }

    /// Writes the content to `path`, replacing any existing file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tokio::fs::write(path, &self.data).await?;
        Ok(())
    }
}

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reduces a client-supplied filename to something safe to use on disk.
///
/// Non-ASCII characters are dropped, path separators become spaces,
/// whitespace runs become `_`, anything outside `[A-Za-z0-9_.-]` is removed
/// and leading or trailing `.`/`_` are trimmed. The result may be empty.
///
/// ```rust
/// use flagon::secure_filename;
///
/// assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
/// assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|ch| if ch == '/' || ch == '\\' { ' ' } else { ch })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|ch| ch == '.' || ch == '_');

    let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if !trimmed.is_empty() && WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        return format!("_{trimmed}");
    }
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_filename_strips_dangerous_parts() {
        assert_eq!(secure_filename("upload_file.txt"), "upload_file.txt");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(secure_filename("__.__"), "");
        assert_eq!(secure_filename("con.txt"), "_con.txt");
    }

    #[test]
    fn urlencoded_fields() {
        let form = Form::from_urlencoded(b"username=mido&password=p%40ss+word");
        assert_eq!(form.get("username"), Some("mido"));
        assert_eq!(form.require("password").unwrap(), "p@ss word");
        assert!(matches!(form.require("missing"), Err(Error::MissingField(_))));
    }

    #[test]
    fn fields_in_submission_order() {
        let form = Form::from_urlencoded(b"b=2&a=1&b=3");
        let fields: Vec<(&str, &str)> = form.fields().collect();
        assert_eq!(fields, vec![("b", "2"), ("a", "1"), ("b", "3")]);
        assert_eq!(form.get("b"), Some("2"));
    }

    #[tokio::test]
    async fn multipart_fields_and_files() {
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"note\"\r\n\r\n",
            "hello\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"the_file\"; filename=\"a b.txt\"\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "file body\r\n",
            "--XBOUNDARY--\r\n",
        );
        let form = Form::from_multipart(Bytes::from_static(body.as_bytes()), "XBOUNDARY".into())
            .await
            .unwrap();

        assert_eq!(form.get("note"), Some("hello"));
        let file = form.require_file("the_file").unwrap();
        assert_eq!(file.filename(), Some("a b.txt"));
        assert_eq!(file.content_type(), Some("text/plain"));
        assert_eq!(file.data(), b"file body");
        assert!(matches!(form.require_file("other"), Err(Error::MissingFile(_))));
    }
}
