//! `ace_ari`: a CLI wrapper that drives one [`Transcoder`] per invocation —
//! a top-level `Args` plus a thin `main` that dispatches to library calls
//! and wraps their errors in `anyhow::Context`. This binary contains no
//! codec logic of its own.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use serde::Deserialize;

use ace::catalog::{Adm, Catalog};
use ace::registry::ObjectType;
use ace::transcoder::{Form as AceForm, Input, Rendered, Transcoder};

/// AMM CODEC Engine: transcodes ARIs between text, CBOR, and CBOR-hex forms.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// input wire form
    #[arg(long, value_enum)]
    inform: WireForm,
    /// output wire form
    #[arg(long, value_enum)]
    outform: WireForm,
    /// input path, defaults to standard input
    #[arg(long)]
    input: Option<PathBuf>,
    /// output path, defaults to standard output
    #[arg(long)]
    output: Option<PathBuf>,
    /// reject references that can't resolve to a numeric enumerator
    #[arg(long)]
    must_nickname: bool,
    /// reject references that can't resolve to a symbolic name
    #[arg(long)]
    must_lookup: bool,
    /// ADM JSON file to load into the catalog (repeatable)
    #[arg(long = "adm-path")]
    adm_path: Vec<PathBuf>,
    /// enable info-level diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WireForm {
    Text,
    Cbor,
    Cborhex,
}

impl From<WireForm> for AceForm {
    fn from(w: WireForm) -> Self {
        match w {
            WireForm::Text => AceForm::Text,
            WireForm::Cbor => AceForm::Cbor,
            WireForm::Cborhex => AceForm::CborHex,
        }
    }
}

/// One namespace entry in an ADM JSON file. The on-disk schema is
/// intentionally minimal — no caching, no schema versioning — a full
/// ADM loader (search paths, caching) is out of this crate's scope.
#[derive(Debug, Deserialize)]
struct AdmFile {
    namespace: String,
    enumerator: u64,
    objects: Vec<AdmObject>,
}

#[derive(Debug, Deserialize)]
struct AdmObject {
    enumerator: u64,
    name: String,
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default)]
    params: Vec<String>,
}

fn load_catalog(paths: &[PathBuf]) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    for path in paths {
        debug!("loading ADM file {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading ADM file {}", path.display()))?;
        let file: AdmFile = serde_json::from_str(&text)
            .with_context(|| format!("parsing ADM file {}", path.display()))?;
        let mut adm = Adm::new(file.namespace.clone(), file.enumerator);
        for obj in file.objects {
            let object_type = ObjectType::by_name(&obj.object_type).ok_or_else(|| {
                anyhow!("ADM file {}: unknown object type '{}'", path.display(), obj.object_type)
            })?;
            adm.define(obj.enumerator, obj.name, object_type, obj.params);
        }
        info!("loaded ADM '{}' ({} objects)", file.namespace, adm.objects.len());
        catalog
            .add_adm(adm)
            .with_context(|| format!("ADM file {}", path.display()))?;
    }
    Ok(catalog)
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(p) => fs::read(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: &Option<PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) => fs::write(p, bytes).with_context(|| format!("writing {}", p.display())),
        None => {
            io::stdout().write_all(bytes)?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "info" } else { "off" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let catalog = load_catalog(&args.adm_path)?;
    let transcoder = Transcoder::new(&catalog);

    let inform: AceForm = args.inform.into();
    let outform: AceForm = args.outform.into();

    let raw = read_input(&args.input)?;

    let mut out = Vec::new();
    match inform {
        AceForm::Text | AceForm::CborHex => {
            let text = String::from_utf8(raw).context("input is not valid UTF-8")?;
            for line in text.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let rendered = transcoder
                    .transcode(inform, Input::Text(line), outform, args.must_nickname, args.must_lookup)
                    .with_context(|| format!("transcoding line: {line}"))?;
                append_rendered(&mut out, rendered);
            }
        }
        AceForm::Cbor => {
            let mut remaining: &[u8] = &raw;
            while !remaining.is_empty() {
                let consumed = find_item_boundary(&transcoder, remaining)?;
                let rendered = transcoder
                    .transcode(inform, Input::Bytes(&remaining[..consumed]), outform, args.must_nickname, args.must_lookup)
                    .context("transcoding CBOR item")?;
                remaining = &remaining[consumed..];
                append_rendered(&mut out, rendered);
            }
        }
    }

    write_output(&args.output, &out)
}

/// Finds how many bytes from the front of `bytes` make up exactly one CBOR
/// item, for stream framing in binary mode (one ARI per CBOR item, with no
/// length prefix on the wire). The item itself is decoded later, through
/// `Transcoder::transcode`, so that resolution runs the same way it does
/// for the text/cborhex input forms.
fn find_item_boundary(transcoder: &Transcoder, bytes: &[u8]) -> Result<usize> {
    for end in 1..=bytes.len() {
        if transcoder.decode(AceForm::Cbor, Input::Bytes(&bytes[..end])).is_ok() {
            return Ok(end);
        }
    }
    Err(anyhow!("could not find a complete CBOR item in the remaining input"))
}

fn append_rendered(out: &mut Vec<u8>, rendered: Rendered) {
    match rendered {
        Rendered::Text(s) => {
            out.extend_from_slice(s.as_bytes());
            out.push(b'\n');
        }
        Rendered::Binary(b) => out.extend_from_slice(&b),
    }
}
