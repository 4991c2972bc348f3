//! Offline container commands.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use fastdog_container::{Progress, StreamDecoder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Read size when feeding the incremental decoder.
const READ_CHUNK: usize = 64 * 1024;

/// Write a container for `input`, returning where it went.
pub fn transcode(input: &Path, output: Option<&Path>, mut report: impl Write) -> Result<PathBuf> {
    let output = match output {
        Some(output) => output.to_path_buf(),
        None => {
            let output = input.with_extension("fastdog");
            if output == input {
                exn::bail!(ErrorKind::Overwrite(output));
            }
            output
        },
    };
    let source = std::fs::read(input).or_raise(|| ErrorKind::Read(input.to_path_buf()))?;
    let transcoded = fastdog_gltf::transcode(&source).or_raise(|| ErrorKind::Transcode(input.to_path_buf()))?;
    std::fs::write(&output, &transcoded.container).or_raise(|| ErrorKind::Write(output.clone()))?;
    tracing::info!(input = %input.display(), output = %output.display(), version = %transcoded.version, "container written");
    writeln!(
        report,
        "{} -> {} ({} -> {} bytes, version {})",
        input.display(),
        output.display(),
        source.len(),
        transcoded.container.len(),
        transcoded.version,
    )
    .or_raise(|| ErrorKind::Write(PathBuf::from("-")))?;
    Ok(output)
}

/// Stream a container from disk through [`StreamDecoder`] and write its JSON.
pub fn decode(input: &Path, mut output: impl Write, output_name: &Path) -> Result<()> {
    let mut file = File::open(input).or_raise(|| ErrorKind::Read(input.to_path_buf()))?;
    let mut decoder = StreamDecoder::new();
    let mut buffer = vec![0u8; READ_CHUNK];
    let decoded = loop {
        let read = file.read(&mut buffer).or_raise(|| ErrorKind::Read(input.to_path_buf()))?;
        let progress = decoder.push(&buffer[..read]).or_raise(|| ErrorKind::Decode(input.to_path_buf()))?;
        match progress {
            Progress::Complete(decoded) => break decoded,
            Progress::NeedMore { received, expected } if read == 0 => {
                tracing::debug!(received, ?expected, "input ended before the container did");
                let truncated = fastdog_container::error::ErrorKind::Truncated {
                    needed: expected.unwrap_or(fastdog_container::OVERHEAD),
                    available: received,
                };
                return Err(exn::Exn::from(truncated)).or_raise(|| ErrorKind::Decode(input.to_path_buf()));
            },
            Progress::NeedMore { .. } => {},
        }
    };
    output.write_all(&decoded.json).or_raise(|| ErrorKind::Write(output_name.to_path_buf()))?;
    output.flush().or_raise(|| ErrorKind::Write(output_name.to_path_buf()))?;
    Ok(())
}

/// Print a container's header fields.
pub fn inspect(input: &Path, mut report: impl Write) -> Result<()> {
    let bytes = std::fs::read(input).or_raise(|| ErrorKind::Read(input.to_path_buf()))?;
    let header = fastdog_container::inspect(&bytes).or_raise(|| ErrorKind::Decode(input.to_path_buf()))?;
    let write = || ErrorKind::Write(PathBuf::from("-"));
    writeln!(report, "file:            {}", input.display()).or_raise(write)?;
    writeln!(report, "format version:  {}", header.version).or_raise(write)?;
    writeln!(report, "compressed size: {}", header.compressed_len).or_raise(write)?;
    writeln!(report, "original size:   {}", header.original_len).or_raise(write)?;
    writeln!(report, "container size:  {}", header.total_len()).or_raise(write)?;
    writeln!(report, "ratio:           {:.2}", header.ratio()).or_raise(write)?;
    if bytes.len() > header.total_len() {
        writeln!(report, "trailing bytes:  {}", bytes.len() - header.total_len()).or_raise(write)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastdog_container::FormatVersion;

    const DOCUMENT: &[u8] = br#"{"asset":{"version":"2.0"},"meshes":[{"primitives":[]}]}"#;

    #[test]
    fn transcode_then_decode() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Duck.gltf");
        std::fs::write(&input, DOCUMENT).unwrap();

        let mut report = Vec::new();
        let output = transcode(&input, None, &mut report).unwrap();
        assert_eq!(output, dir.path().join("Duck.fastdog"));
        assert!(String::from_utf8(report).unwrap().contains("version 1"));

        let mut json = Vec::new();
        decode(&output, &mut json, Path::new("-")).unwrap();
        assert_eq!(json, DOCUMENT);
    }

    #[test]
    fn transcode_refuses_to_overwrite_its_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Duck.fastdog");
        std::fs::write(&input, fastdog_container::encode(DOCUMENT, FormatVersion::Gltf).unwrap()).unwrap();
        let err = transcode(&input, None, std::io::sink()).unwrap_err();
        assert_eq!(*err, ErrorKind::Overwrite(input));
    }

    #[test]
    fn decode_large_container_across_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.fastdog");
        // Pseudo-random names keep the compressed form larger than one read.
        let nodes: Vec<String> = (0..60_000u64)
            .map(|i| format!(r#"{{"name":"n{}"}}"#, i.wrapping_mul(2_654_435_761) % 1_000_003))
            .collect();
        let document = format!(r#"{{"nodes":[{}]}}"#, nodes.join(","));
        let container = fastdog_container::encode(document.as_bytes(), FormatVersion::Glb).unwrap();
        assert!(container.len() > READ_CHUNK);
        std::fs::write(&path, &container).unwrap();

        let mut json = Vec::new();
        decode(&path, &mut json, Path::new("-")).unwrap();
        assert_eq!(json, document.as_bytes());
    }

    #[test]
    fn decode_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.fastdog");
        let container = fastdog_container::encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        std::fs::write(&path, &container[..container.len() - 3]).unwrap();
        let err = decode(&path, std::io::sink(), Path::new("-")).unwrap_err();
        assert_eq!(*err, ErrorKind::Decode(path));
    }

    #[test]
    fn inspect_prints_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Duck.fastdog");
        let container = fastdog_container::encode(DOCUMENT, FormatVersion::Glb).unwrap();
        std::fs::write(&path, &container).unwrap();

        let mut report = Vec::new();
        inspect(&path, &mut report).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert!(report.contains("format version:  2"), "{report}");
        assert!(report.contains(&format!("original size:   {}", DOCUMENT.len())), "{report}");
        assert!(report.contains(&format!("container size:  {}", container.len())), "{report}");
    }

    #[test]
    fn inspect_rejects_non_containers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Duck.gltf");
        std::fs::write(&path, DOCUMENT).unwrap();
        let err = inspect(&path, std::io::sink()).unwrap_err();
        assert_eq!(*err, ErrorKind::Decode(path));
    }
}
