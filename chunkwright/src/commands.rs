use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;

use chunkwright_core::payload::{self, Compression};
use chunkwright_core::{ChunkFormat, Family, Platform, VersionRegistry};
use chunkwright_metrics::ConversionMetrics;
use chunkwright_schematic::Schematic;

#[derive(Debug, Serialize)]
struct ChunkSummary {
    path: PathBuf,
    data_version: i32,
    interface: String,
    cx: i32,
    cz: i32,
    status: String,
    sections: Vec<i32>,
    palette: Vec<String>,
    families: Vec<&'static str>,
}

fn read_nbt(path: &Path, framed: bool) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let nbt = if framed {
        payload::unwrap(&bytes).map(|(nbt, _)| nbt)
    } else {
        payload::decompress_auto(&bytes)
    };
    nbt.with_context(|| format!("Failed to unpack {}", path.display()))
}

fn summarize(format: &ChunkFormat, path: &Path, framed: bool, metrics: &ConversionMetrics) -> Result<ChunkSummary> {
    let nbt = read_nbt(path, framed)?;
    let start = Instant::now();
    let loaded = format
        .load(&nbt)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    metrics.record_decode(start.elapsed(), nbt.len());

    let chunk = loaded.chunk;
    Ok(ChunkSummary {
        path: path.to_path_buf(),
        data_version: loaded.data_version,
        interface: loaded.interface.name().to_string(),
        cx: chunk.cx,
        cz: chunk.cz,
        status: chunk.status.clone(),
        sections: chunk.sections.keys().copied().collect(),
        palette: chunk.palette.iter().map(ToString::to_string).collect(),
        families: Family::ALL
            .into_iter()
            .filter(|f| chunk.misc(*f).is_some())
            .map(Family::logical_name)
            .collect(),
    })
}

pub fn inspect(files: &[PathBuf], framed: bool, json: bool, report: bool) -> Result<()> {
    let format = ChunkFormat::java();
    let metrics = ConversionMetrics::new(format!("inspect {} files", files.len()));

    let results: Vec<Result<ChunkSummary>> = files
        .par_iter()
        .map(|path| summarize(&format, path, framed, &metrics))
        .collect();

    let mut summaries = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                metrics.record_failure();
                log::error!("{e:#}");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for s in &summaries {
            println!(
                "{}: chunk ({}, {}) DataVersion {} via {}, status {}, {} sections, {} palette entries, families [{}]",
                s.path.display(),
                s.cx,
                s.cz,
                s.data_version,
                s.interface,
                s.status,
                s.sections.len(),
                s.palette.len(),
                s.families.join(", ")
            );
        }
    }
    if report {
        eprintln!("{}", metrics.generate_report());
    }

    let failed = files.len() - summaries.len();
    if failed > 0 {
        bail!("{failed} of {} files could not be decoded", files.len());
    }
    Ok(())
}

pub fn convert(
    input: &Path,
    output: &Path,
    target_version: i32,
    compression: Compression,
    framed: bool,
    report: bool,
) -> Result<()> {
    let format = ChunkFormat::java();
    let metrics = ConversionMetrics::new(format!("target={target_version} compression={compression} framed={framed}"));

    let nbt = read_nbt(input, framed)?;
    let start = Instant::now();
    let loaded = format
        .load(&nbt)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    metrics.record_decode(start.elapsed(), nbt.len());

    let start = Instant::now();
    let saved = format
        .save(&loaded.chunk, target_version)
        .with_context(|| format!("Failed to encode for DataVersion {target_version}"))?;
    let bytes = if framed {
        payload::wrap(&saved.bytes, compression)?
    } else {
        compression.compress(&saved.bytes)?
    };
    metrics.record_encode(start.elapsed(), bytes.len(), saved.dropped.len());

    std::fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "{} ({}) -> {} ({}), {} bytes",
        input.display(),
        loaded.interface.name(),
        output.display(),
        saved.interface.name(),
        bytes.len()
    );
    for family in &saved.dropped {
        log::warn!("{family} is not stored by {} and was dropped", saved.interface.name());
    }
    if report {
        eprintln!("{}", metrics.generate_report());
    }
    Ok(())
}

pub fn describe(platform: Platform, version: Option<i32>) -> Result<()> {
    let registry = VersionRegistry::builtin();
    match version {
        Some(version) => {
            let interface = registry.resolve(platform, version)?;
            println!("{}", serde_json::to_string_pretty(&*interface)?);
        }
        None => {
            let mut interfaces: Vec<_> = registry.interfaces().filter(|i| i.platform() == platform).collect();
            interfaces.sort_by_key(|i| i.range().start());
            for interface in interfaces {
                println!("{:<12} {}", interface.name(), interface.range());
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SchematicSummary {
    platform: Platform,
    width: u16,
    height: u16,
    length: u16,
    columns: usize,
    distinct_blocks: usize,
    entities: usize,
    block_entities: usize,
}

pub fn schematic(path: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let schematic = Schematic::from_bytes(&bytes).with_context(|| format!("Failed to parse {}", path.display()))?;

    let distinct: BTreeSet<(u16, u8)> = schematic
        .blocks
        .iter()
        .copied()
        .zip(schematic.data.iter().copied())
        .collect();
    let summary = SchematicSummary {
        platform: schematic.platform,
        width: schematic.width,
        height: schematic.height,
        length: schematic.length,
        columns: schematic.chunks().len(),
        distinct_blocks: distinct.len(),
        entities: schematic.entities.len(),
        block_entities: schematic.block_entities.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} schematic {}x{}x{}: {} columns, {} distinct blocks, {} entities, {} block entities",
            summary.platform,
            summary.width,
            summary.height,
            summary.length,
            summary.columns,
            summary.distinct_blocks,
            summary.entities,
            summary.block_entities
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkwright_core::{Block, Chunk};

    fn diamond_chunk() -> Chunk {
        let mut chunk = Chunk::new(1, 2);
        chunk
            .set_block(0, 10, 0, Block::new("minecraft", "diamond_ore").unwrap())
            .unwrap();
        chunk
    }

    #[test]
    fn test_convert_framed_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");

        let format = ChunkFormat::java();
        let saved = format.save(&diamond_chunk(), 1976).unwrap();
        std::fs::write(&input, payload::wrap(&saved.bytes, Compression::Gzip).unwrap()).unwrap();

        convert(&input, &output, 4671, Compression::Zlib, true, false).unwrap();

        let (nbt, compression) = payload::unwrap(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(compression, Compression::Zlib);
        let loaded = format.load(&nbt).unwrap();
        assert_eq!(loaded.data_version, 4671);
        assert_eq!(
            loaded.chunk.block_at(0, 10, 0),
            Some(&Block::new("minecraft", "diamond_ore").unwrap())
        );
    }

    #[test]
    fn test_inspect_reads_convert_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chunk.nbt");
        let saved = ChunkFormat::java().save(&diamond_chunk(), 2586).unwrap();
        std::fs::write(&input, &saved.bytes).unwrap();

        for compression in [Compression::Gzip, Compression::Zlib, Compression::None, Compression::Lz4] {
            let output = dir.path().join(format!("chunk-{compression}.nbt"));
            convert(&input, &output, 4671, compression, false, false).unwrap();
            inspect(std::slice::from_ref(&output), false, true, false).unwrap();

            let loaded = ChunkFormat::java().load(&read_nbt(&output, false).unwrap()).unwrap();
            assert_eq!(loaded.data_version, 4671, "{compression}");
        }
    }

    #[test]
    fn test_inspect_reports_failures() {
        let mut bad = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut bad, b"not nbt").unwrap();
        let path = bad.path().to_path_buf();
        assert!(inspect(std::slice::from_ref(&path), false, true, false).is_err());
    }

    #[test]
    fn test_describe_unknown_version() {
        assert!(describe(Platform::Java, Some(100)).is_err());
        assert!(describe(Platform::Bedrock, None).is_ok());
    }
}
