use crate::ANNOTATION_PREFIX;

pub fn get_gateway_id_annotation() -> String {
    format!("{ANNOTATION_PREFIX}/nat-gateway-id")
}

pub fn get_eip_candidates_annotation() -> String {
    format!("{ANNOTATION_PREFIX}/eip-id")
}

/// Splits the candidate list keeping empty segments, they mark ordinal slots without an EIP.
pub fn parse_eip_candidates(raw: &str) -> Vec<String> {
    raw.split(',').map(|eip| eip.trim().to_owned()).collect()
}
