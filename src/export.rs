use std::fs;
use std::io;
use std::path::Path;

use log::info;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::PipelineError;
use crate::logistic_regression::ModelParameters;

/// Console form kept exactly as the historical scripts printed it.
pub fn print_parameters(parameters: &ModelParameters) {
    println!("Weights: {:?}", parameters.weights);
    println!("Bias: {}", parameters.bias);
}

/// Serializes the parameters as 4-space-indented JSON. The file is staged
/// next to the destination and renamed into place, so a crash mid-write
/// cannot leave a truncated file at the destination. An existing file is
/// overwritten.
pub fn write_parameters(parameters: &ModelParameters, path: &Path) -> Result<(), PipelineError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    parameters.serialize(&mut serializer)?;
    buffer.push(b'\n');

    let staging = staging_path(path)?;
    fs::write(&staging, &buffer).map_err(|source| PipelineError::Io {
        path: staging.clone(),
        source,
    })?;
    fs::rename(&staging, path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("wrote model parameters to {}", path.display());

    Ok(())
}

/// Reads parameters back from an exported file.
pub fn read_parameters(path: &Path) -> Result<ModelParameters, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_json::from_str(&contents)?)
}

fn staging_path(path: &Path) -> Result<std::path::PathBuf, PipelineError> {
    let Some(name) = path.file_name() else {
        return Err(PipelineError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        });
    };

    let mut staged = name.to_os_string();
    staged.push(".tmp");

    Ok(path.with_file_name(staged))
}
