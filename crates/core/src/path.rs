//! Subnet path and associated-resource annotation conversions.
//!
//! The annotation form is `<project>:<vpc>:<subnet>`; the path form is
//! `/orgs/<org>/projects/<project>/vpcs/<vpc>/subnets/<subnet>`.

use crate::Error;

const DEFAULT_ORG: &str = "default";

/// Expand an associated-resource annotation into a full subnet path under
/// the default org.
pub fn subnet_path_from_associated_resource(annotation: &str) -> Result<String, Error> {
    let parts: Vec<&str> = annotation.split(':').collect();
    match parts.as_slice() {
        [project, vpc, subnet]
            if !project.is_empty() && !vpc.is_empty() && !subnet.is_empty() =>
        {
            Ok(format!(
                "/orgs/{DEFAULT_ORG}/projects/{project}/vpcs/{vpc}/subnets/{subnet}"
            ))
        }
        _ => Err(Error::InvalidAssociatedResource(annotation.to_string())),
    }
}

/// Split a full subnet path into `(org, project, vpc, subnet)`.
pub fn extract_subnet_path(path: &str) -> Result<(String, String, String, String), Error> {
    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        ["", "orgs", org, "projects", project, "vpcs", vpc, "subnets", subnet]
            if !org.is_empty() && !project.is_empty() && !vpc.is_empty() && !subnet.is_empty() =>
        {
            Ok((
                (*org).to_string(),
                (*project).to_string(),
                (*vpc).to_string(),
                (*subnet).to_string(),
            ))
        }
        _ => Err(Error::InvalidSubnetPath(path.to_string())),
    }
}

/// Inverse of [`subnet_path_from_associated_resource`] for well-formed paths.
pub fn associated_resource_from_subnet_path(path: &str) -> Result<String, Error> {
    let (_org, project, vpc, subnet) = extract_subnet_path(path)?;
    Ok(format!("{project}:{vpc}:{subnet}"))
}
