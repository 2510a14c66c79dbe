//! `artifact-name`: print the deterministic artifact file name.

use crate::cli::ParamArgs;
use crate::error::Result;
use crate::pipeline::{GitRef, Settings};

pub fn execute(settings: &Settings, args: &ParamArgs, git_ref: Option<&str>) -> Result<i32> {
    let mut params = super::run_params(args, settings);

    // Same defaulting as a real run: a tag supplies the version
    if params.version.is_none() {
        params.version = git_ref
            .map(GitRef::parse)
            .and_then(|r| r.tag_version().map(str::to_string));
    }

    println!("{}", settings.artifact_file_name(&params)?);
    Ok(0)
}
