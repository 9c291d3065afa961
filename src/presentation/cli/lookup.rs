use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{LocatorArgs, ProbeArgs, print_json, read_input};
use crate::application::services::{plan_lookup, resolve_records};
use crate::domain::guia;
use crate::domain::input::parse_input;
use crate::infrastructure::image_source::HttpImageSource;

#[derive(Debug, Args)]
pub struct ParseCommand {
    /// Lookup text; read from stdin when omitted
    pub input: Option<String>,

    #[command(flatten)]
    pub locator: LocatorArgs,
}

pub fn parse(command: ParseCommand) -> Result<()> {
    let locator = command.locator.locator()?;
    let raw = read_input(command.input)?;
    let plan = plan_lookup(&raw, &locator)?;
    print_json(&plan)
}

#[derive(Debug, Args)]
pub struct UrlsCommand {
    #[arg(long)]
    pub ssc: String,

    #[arg(long)]
    pub guia: String,

    #[command(flatten)]
    pub locator: LocatorArgs,
}

#[derive(Debug, Serialize)]
struct RecordUrls {
    ssc: String,
    guia: String,
    pdf_url: String,
    image_urls: Vec<String>,
}

pub fn urls(command: UrlsCommand) -> Result<()> {
    let locator = command.locator.locator()?;
    let guia = guia::normalize(command.guia.trim());

    print_json(&RecordUrls {
        pdf_url: locator.pdf_url(&command.ssc),
        image_urls: locator.image_candidates(&guia),
        ssc: command.ssc,
        guia,
    })
}

#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Lookup text; read from stdin when omitted
    pub input: Option<String>,

    /// How many records to probe at once
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    #[command(flatten)]
    pub locator: LocatorArgs,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

pub async fn resolve(command: ResolveCommand) -> Result<()> {
    let locator = command.locator.locator()?;
    let raw = read_input(command.input)?;
    let records = parse_input(&raw)?.into_records();

    let source = HttpImageSource::with_timeout(command.probe.timeout())?;
    let resolved = resolve_records(&source, &locator, &records, command.concurrency).await;
    print_json(&resolved)
}
