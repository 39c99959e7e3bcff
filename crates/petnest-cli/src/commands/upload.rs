//! Media upload command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use petnest::ApiClient;

use super::require_session;
use crate::output;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// MIME type of the file (guessed from the extension when omitted)
    #[arg(long)]
    pub mime: Option<String>,
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

pub async fn run(client: &ApiClient, args: UploadArgs) -> Result<()> {
    require_session(client).await?;

    let filename = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .context("File name is not valid UTF-8")?
        .to_string();
    let mime = args.mime.as_deref().or_else(|| guess_mime(&args.file));

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    eprintln!("{}", format!("Uploading {}...", filename).dimmed());

    let uploaded = client
        .upload_file(&filename, mime, bytes)
        .await
        .context("Failed to upload file")?;

    output::success("Uploaded");
    output::field("URL", &uploaded.url);
    output::field("Key", &uploaded.key);
    output::field("Type", &format!("{:?}", uploaded.media_type));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(guess_mime(Path::new("dog.JPG")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("clip.mp4")), Some("video/mp4"));
        assert_eq!(guess_mime(Path::new("notes.txt")), None);
        assert_eq!(guess_mime(Path::new("noext")), None);
    }
}
