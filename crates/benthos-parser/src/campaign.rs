use std::fs;
use std::path::Path;

use crate::errors::ParseError;
use crate::model::{CampaignDescriptor, CAMPAIGN_FILENAME, FORMAT_VERSION};

/// Reads `campaign.txt` under `root_path`.
///
/// Unlike description files, an unrecognized label here is a hard error:
/// campaign files are hand-authored and a typo in a label would otherwise
/// silently drop a required field.
pub fn read_campaign_file(root_path: &Path) -> Result<CampaignDescriptor, ParseError> {
    let path = root_path.join(CAMPAIGN_FILENAME);
    if !path.is_file() {
        return Err(ParseError::MissingFile(path));
    }
    let contents = fs::read_to_string(&path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    parse_campaign(&contents)
}

pub fn parse_campaign(contents: &str) -> Result<CampaignDescriptor, ParseError> {
    let mut campaign = CampaignDescriptor::default();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (label, value) = line.split_once(':').unwrap_or((line, ""));
        let label = label.trim();
        let value = value.trim().to_string();

        if label.eq_ignore_ascii_case("Version") {
            campaign.version = value;
        } else if label.eq_ignore_ascii_case("Name") {
            campaign.short_name = value;
        } else if label.eq_ignore_ascii_case("Description") {
            campaign.description = value;
        } else if label.eq_ignore_ascii_case("Associated Researchers") {
            campaign.associated_researchers = value;
        } else if label.eq_ignore_ascii_case("Associated Publications") {
            campaign.associated_publications = value;
        } else if label.eq_ignore_ascii_case("Associated Research Grants") {
            campaign.associated_research_grants = value;
        } else if label.eq_ignore_ascii_case("Start Date") {
            campaign.date_start = value;
        } else if label.eq_ignore_ascii_case("End Date") {
            campaign.date_end = value;
        } else if label.eq_ignore_ascii_case("Contact Person") {
            campaign.contact_person = value;
        } else {
            return Err(ParseError::UnknownLabel {
                file: CAMPAIGN_FILENAME.to_string(),
                label: label.to_string(),
            });
        }
    }

    if campaign.version.replace(' ', "") != FORMAT_VERSION {
        return Err(ParseError::UnsupportedVersion {
            file: CAMPAIGN_FILENAME.to_string(),
            found: campaign.version,
        });
    }

    Ok(campaign)
}
