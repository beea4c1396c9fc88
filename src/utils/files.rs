use std::path::Path;

use tokio::{
    fs::File,
    io::{self, AsyncBufReadExt, Lines},
};

/// Read a file from the given path into a list of lines, skipping blank ones
pub async fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let mut r = file_reader(path.as_ref()).await?;
    let mut lines = Vec::new();

    while let Some(line) = r.next_line().await? {
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines)
}

/// Create the parent directory of a file path if it is missing
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

async fn file_reader(path: &Path) -> io::Result<Lines<io::BufReader<File>>> {
    let f = File::open(path).await?;

    Ok(io::BufReader::new(f).lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_lines_skips_blank_lines() {
        let dir = std::env::temp_dir().join("burn-text-cnn-files-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lines.txt");
        std::fs::write(&path, "first\n\n  \nsecond\n").unwrap();

        let lines = read_lines(&path).await.unwrap();

        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_ensure_parent_dir_accepts_bare_file_names() {
        assert!(ensure_parent_dir("report.csv").is_ok());
    }
}
