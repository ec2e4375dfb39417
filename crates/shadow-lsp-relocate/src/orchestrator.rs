//! Drives one relocation run from a [`RelocationRequest`].

use std::path::PathBuf;

use tracing::{debug, info};

use crate::archive::{ArchiveAssembler, AssemblyReport, is_zip_file};
use crate::constants::LSP_PACKAGE_PREFIX;
use crate::error::{Error, Result};
use crate::relocator::{PackageRelocator, Relocator};
use crate::request::RelocationRequest;
use crate::transformer::{DescriptorTransformer, NamedFileTransformer, ResourceTransformer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelocationOutcome {
    pub output: PathBuf,
    pub report: AssemblyReport,
}

/// Relocate the LSP and DAP libraries of `request.source_archive`.
///
/// The request is validated on every call, before the archive is opened.
pub fn relocate(request: &RelocationRequest) -> Result<RelocationOutcome> {
    request.validate()?;
    let output = request.output_path()?;

    let source = &request.source_archive;
    if !source.is_file() {
        return Err(Error::SourceArchiveMissing(source.clone()));
    }
    if !is_zip_file(source)? {
        return Err(Error::UnsupportedFormat(source.clone()));
    }

    let assembler = transformers(request)
        .into_iter()
        .fold(ArchiveAssembler::new(relocators(request)?), ArchiveAssembler::transform);

    info!(
        language_ids = ?request.enabled_feature_ids,
        "Relocating LSP and DAP libraries in {} into package {}",
        source.display(),
        request.target_package_prefix
    );

    let report = assembler.assemble(source, &output)?;

    info!(
        output = %output.display(),
        entries = report.entries_written,
        classes = report.relocated_classes,
        descriptors = report.transformed.len(),
        "relocated archive written"
    );

    Ok(RelocationOutcome { output, report })
}

/// Zero or one package rename, depending on `relocate_bytecode`.
pub fn relocators(request: &RelocationRequest) -> Result<Vec<Box<dyn Relocator>>> {
    if !request.relocate_bytecode {
        debug!("bytecode relocation disabled, descriptors keep the original package");
        return Ok(vec![]);
    }

    let relocator = PackageRelocator::new(LSP_PACKAGE_PREFIX, &request.target_package_prefix)?;
    Ok(vec![Box::new(relocator)])
}

/// Snippet merging always runs; named files are added when configured.
pub fn transformers(request: &RelocationRequest) -> Vec<ResourceTransformer> {
    let mut transformers = vec![ResourceTransformer::SnippetMerge(DescriptorTransformer::new(
        request.enabled_feature_ids.iter().cloned(),
    ))];

    if !request.named_xml_paths.is_empty() {
        transformers.push(ResourceTransformer::NamedFiles(NamedFileTransformer::new(
            request.named_xml_paths.iter().cloned(),
        )));
    }

    transformers
}
