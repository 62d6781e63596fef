use kube::api::ListParams;

use crate::ANNOTATION_PREFIX;

pub const ENABLE_LABEL_VALUE: &str = "true";

pub fn get_enable_label() -> String {
    format!("{ANNOTATION_PREFIX}/enable")
}

pub fn get_joined_enable_selector() -> String {
    format!("{}={ENABLE_LABEL_VALUE}", get_enable_label())
}

pub fn get_enabled_pods_listparams() -> ListParams {
    ListParams::default().labels(&get_joined_enable_selector())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_enable_label() {
        assert_eq!(
            get_joined_enable_selector(),
            "adjust-snat-controller.alphagodzilla/enable=true"
        );
        assert_eq!(
            get_enabled_pods_listparams().label_selector.as_deref(),
            Some("adjust-snat-controller.alphagodzilla/enable=true")
        );
    }
}
