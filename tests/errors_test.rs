#[cfg(test)]
mod error_tests {
    use lenscaps::errors::CapabilityError;
    use std::error::Error;

    #[test]
    fn test_hardware_query_error() {
        let error = CapabilityError::HardwareQuery("camera service died".to_string());
        assert_eq!(error.to_string(), "Hardware query failed: camera service died");
    }

    #[test]
    fn test_invalid_persisted_value_error() {
        let error = CapabilityError::InvalidPersistedValue {
            key: "video_codec".to_string(),
            value: "VP9".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid persisted value for video_codec: VP9");
    }

    #[test]
    fn test_empty_capability_set_error() {
        let error = CapabilityError::EmptyCapabilitySet("no frame rates".to_string());
        assert!(error.to_string().starts_with("Empty capability set"));
        assert!(error.to_string().contains("no frame rates"));
    }

    #[test]
    fn test_unsupported_selection_error() {
        let error = CapabilityError::UnsupportedSelection("240 fps is not offered".to_string());
        assert_eq!(error.to_string(), "Unsupported selection: 240 fps is not offered");
    }

    #[test]
    fn test_store_and_configuration_errors() {
        let store = CapabilityError::PreferenceStore("read-only".to_string());
        assert!(store.to_string().contains("Preference store error"));

        let config = CapabilityError::Configuration("bad toml".to_string());
        assert_eq!(config.to_string(), "Configuration error: bad toml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "prefs.toml missing");
        let error: CapabilityError = io.into();
        assert!(matches!(error, CapabilityError::Io(_)));
        assert!(error.to_string().contains("prefs.toml missing"));
    }

    #[test]
    fn test_error_debug_format() {
        let error = CapabilityError::HardwareQuery("Debug test".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("HardwareQuery"));
        assert!(debug_str.contains("Debug test"));
    }

    #[test]
    fn test_error_trait_object() {
        let error = CapabilityError::Configuration("boxed".to_string());
        let boxed: Box<dyn Error> = Box::new(error.clone());
        assert_eq!(boxed.to_string(), error.to_string());
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_errors_are_comparable() {
        let a = CapabilityError::Io("x".to_string());
        assert_eq!(a.clone(), a);
        assert_ne!(a, CapabilityError::Configuration("x".to_string()));
    }
}
