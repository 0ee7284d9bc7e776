// Sequence submission to the FluSurver web form

use flusurver_scanner::error::{Result, ScanError};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://flusurver.bii.a-star.edu.sg/cgi-bin/flumapBlast3.pl";
pub const DEFAULT_FORCEREF: &str = "autorefall";
pub const DEFAULT_LCLQ: u32 = 1;

/// Form data for one submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub file_name: String,
    pub contents: String,
    pub forceref: String,
    pub lclq: u32,
}

impl Submission {
    pub fn from_file(path: &Path, forceref: &str, lclq: u32) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Err(ScanError::InputUnavailable(format!(
                "sequence file {} is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sequence.fa".to_string());

        Ok(Self {
            file_name,
            contents,
            forceref: forceref.to_string(),
            lclq,
        })
    }

    /// The form sends the sequence both inline and as a file upload.
    pub fn to_form(&self) -> Form {
        let file_part = Part::bytes(self.contents.clone().into_bytes()).file_name(self.file_name.clone());

        Form::new()
            .text("seq", self.contents.trim().to_string())
            .text("forceref", self.forceref.clone())
            .text("lclq", self.lclq.to_string())
            .text("Submit", "Submit")
            .part("seqfile", file_part)
    }
}

pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("flusurver/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Posts the submission and returns the raw response body.
pub async fn submit_sequence(client: &Client, endpoint: &Url, submission: &Submission) -> Result<String> {
    info!(
        "Submitting {} to {} (forceref={}, lclq={})",
        submission.file_name, endpoint, submission.forceref, submission.lclq
    );

    let response = client
        .post(endpoint.clone())
        .multipart(submission.to_form())
        .send()
        .await?;

    let status = response.status();
    debug!("Submission answered with status {}", status);
    let body = response.error_for_status()?.text().await?;
    debug!("Response body is {} bytes", body.len());

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method, path},
    };

    fn sequence_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_from_file_rejects_empty_sequence() {
        let file = sequence_file("\n  \n");
        let result = Submission::from_file(file.path(), DEFAULT_FORCEREF, DEFAULT_LCLQ);
        assert!(matches!(result, Err(ScanError::InputUnavailable(_))));
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let result = Submission::from_file(Path::new("/nonexistent/seq.fa"), "test", 1);
        assert!(matches!(result, Err(ScanError::IoError(_))));
    }

    #[tokio::test]
    async fn test_submit_posts_form_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/cgi-bin/flumapBlast3.pl"))
            .and(body_string_contains("name=\"forceref\""))
            .and(body_string_contains("name=\"seqfile\""))
            .and(body_string_contains(">seq1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let file = sequence_file(">seq1\nATGCATGC\n");
        let submission = Submission::from_file(file.path(), "test", 2).unwrap();
        assert_eq!(submission.lclq, 2);

        let endpoint = Url::parse(&format!("{}/cgi-bin/flumapBlast3.pl", mock_server.uri())).unwrap();
        let client = build_client(5).unwrap();
        let body = submit_sequence(&client, &endpoint, &submission).await.unwrap();

        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_submit_error_status_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let file = sequence_file(">seq1\nATGC\n");
        let submission = Submission::from_file(file.path(), DEFAULT_FORCEREF, DEFAULT_LCLQ).unwrap();
        let endpoint = Url::parse(&mock_server.uri()).unwrap();
        let client = build_client(5).unwrap();

        let result = submit_sequence(&client, &endpoint, &submission).await;
        assert!(matches!(result, Err(ScanError::HttpError(_))));
    }
}
