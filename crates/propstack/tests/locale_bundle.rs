//! Tests for locale folder fallback and localized messages.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use propstack::{
    BoolReader, Bundled, LocaleBundle, LocaleFolderChain, Priority, ResolveError, Resolver,
    SearchPath, Signal, args,
};

fn record_signals(resolver: &Resolver) -> Arc<Mutex<Vec<Signal>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    resolver.subscribe_signals(move |signal| sink.lock().push(signal.clone()));
    seen
}

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn french_canadian() -> LocaleFolderChain {
    LocaleFolderChain::builder()
        .locale("fr_CA")
        .available_locales(vec!["fr_FR".to_string(), "en_US".to_string()])
        .build()
        .unwrap()
}

fn bundle(resolver: Resolver, chain: LocaleFolderChain) -> LocaleBundle {
    LocaleBundle::builder()
        .resolver(Arc::new(resolver))
        .chain(chain)
        .build()
}

#[test]
fn falls_back_to_same_language_folder() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "fr_FR/x.prop", "hello=Bonjour");
    write(dir.path(), "en_US/x.prop", "hello=Hello");

    let bundle = bundle(Resolver::new(SearchPath::new([dir.path()])), french_canadian());
    assert_eq!(bundle.chain().folders(), ["fr_CA", "fr_FR", "en_US"]);
    let signals = record_signals(bundle.resolver());

    assert_eq!(
        bundle.add_localized_source("x.prop", Priority::Highest),
        Ok(Some("fr_FR"))
    );
    assert_eq!(bundle.resolver().source_names(), vec!["fr_FR/x.prop"]);

    let signals = signals.lock();
    let current: Vec<_> = signals
        .iter()
        .filter(|s| matches!(s, Signal::CurrentLocaleNotFound { .. }))
        .collect();
    assert_eq!(
        current,
        vec![&Signal::CurrentLocaleNotFound {
            folder: "fr_CA".to_string(),
            file: "x.prop".to_string(),
            path: "fr_CA/x.prop".to_string(),
        }]
    );
    assert!(
        !signals
            .iter()
            .any(|s| matches!(s, Signal::DefaultLocaleNotFound { .. }))
    );
    drop(signals);

    assert_eq!(bundle.get_message("hello", &args![]).unwrap(), "Bonjour");
}

#[test]
fn exact_folder_is_used_without_signals() {
    let resolver = Resolver::new(
        Bundled::new()
            .with("fr_CA/x.prop", "hello=Allo")
            .with("fr_FR/x.prop", "hello=Bonjour"),
    );
    let bundle = bundle(resolver, french_canadian());
    let signals = record_signals(bundle.resolver());

    assert_eq!(
        bundle.add_localized_source("x.prop", Priority::Highest),
        Ok(Some("fr_CA"))
    );
    assert!(signals.lock().is_empty());
    assert_eq!(bundle.get_message("hello", &args![]).unwrap(), "Allo");
}

#[test]
fn missing_everywhere_reports_default_locale_not_found() {
    let bundle = bundle(Resolver::new(Bundled::new()), french_canadian());
    let signals = record_signals(bundle.resolver());

    assert_eq!(
        bundle.add_localized_source("absent.prop", Priority::Highest),
        Ok(None)
    );
    assert!(bundle.resolver().source_names().is_empty());

    let signals = signals.lock();
    let missing = signals
        .iter()
        .filter(|s| matches!(s, Signal::MissingSource { .. }))
        .count();
    assert_eq!(missing, 3);
    assert_eq!(
        signals.last(),
        Some(&Signal::DefaultLocaleNotFound {
            file: "absent.prop".to_string()
        })
    );
}

#[test]
fn english_locale_goes_straight_to_default() {
    let chain = LocaleFolderChain::builder()
        .locale("en_GB")
        .available_locales(vec!["en_AU".to_string()])
        .build()
        .unwrap();
    let resolver = Resolver::new(
        Bundled::new()
            .with("en_AU/x.prop", "colour=Australian")
            .with("en_US/x.prop", "colour=American"),
    );
    let bundle = bundle(resolver, chain);
    assert_eq!(
        bundle.add_localized_source("x.prop", Priority::Highest),
        Ok(Some("en_US"))
    );
    assert_eq!(bundle.get_message("colour", &args![]).unwrap(), "American");
}

#[test]
fn message_parameters_are_substituted() {
    let resolver = Resolver::new(
        Bundled::new().with("en_US/m.prop", "age=Hello {0}, you are {1} years old"),
    );
    let chain = LocaleFolderChain::builder().locale("en_US").build().unwrap();
    let bundle = bundle(resolver, chain);
    bundle.add_localized_source("m.prop", Priority::Highest).unwrap();

    assert_eq!(
        bundle.get_message("age", &args!["Ann", 5]).unwrap(),
        "Hello Ann, you are 5 years old"
    );
    assert_eq!(
        bundle.get_message("age", &["Bob", "7"]).unwrap(),
        "Hello Bob, you are 7 years old"
    );
}

#[test]
fn wrong_parameter_count_yields_empty_message() {
    let resolver = Resolver::new(Bundled::new().with("en_US/m.prop", "greet=Hi {0}"));
    let chain = LocaleFolderChain::builder().locale("en_US").build().unwrap();
    let bundle = bundle(resolver, chain);
    bundle.add_localized_source("m.prop", Priority::Highest).unwrap();
    let signals = record_signals(bundle.resolver());

    assert_eq!(bundle.get_message("greet", &args![]).unwrap(), "");
    assert_eq!(bundle.get_message("greet", &args!["a", "b"]).unwrap(), "");

    let signals = signals.lock();
    assert_eq!(signals.len(), 2);
    assert!(matches!(
        &signals[0],
        Signal::InvalidParameterCount { key, expected: 1, pattern, .. }
            if key == "greet" && pattern == "Hi {0}"
    ));
}

#[test]
fn unknown_message_is_empty() {
    let resolver = Resolver::new(Bundled::new().with("en_US/m.prop", "greet=Hi"));
    let chain = LocaleFolderChain::builder().locale("en_US").build().unwrap();
    let bundle = bundle(resolver, chain);
    bundle.add_localized_source("m.prop", Priority::Highest).unwrap();
    assert_eq!(bundle.get_message("nope", &args![]).unwrap(), "");
}

#[test]
fn no_sources_is_an_error() {
    let chain = LocaleFolderChain::builder().locale("en_US").build().unwrap();
    let bundle = bundle(Resolver::new(Bundled::new()), chain);
    assert!(matches!(
        bundle.get_message("k", &args![]),
        Err(ResolveError::NoSources { .. })
    ));
}

#[test]
fn malformed_pattern_falls_back_to_lower_source() {
    let resolver = Resolver::new(
        Bundled::new()
            .with("en_US/base.prop", "msg=Fine {0}")
            .with("en_US/patch.prop", "msg=Broken {x}"),
    );
    let chain = LocaleFolderChain::builder().locale("en_US").build().unwrap();
    let bundle = bundle(resolver, chain);
    bundle.add_localized_source("base.prop", Priority::Highest).unwrap();
    bundle.add_localized_source("patch.prop", Priority::Highest).unwrap();
    let signals = record_signals(bundle.resolver());

    assert_eq!(bundle.get_message("msg", &args!["A"]).unwrap(), "Fine A");
    let signals = signals.lock();
    assert_eq!(signals.len(), 1);
    assert!(matches!(&signals[0], Signal::ParseError { source, .. } if source == "en_US/patch.prop"));
}

#[test]
fn localized_non_message_values() {
    let resolver = Resolver::new(
        Bundled::new()
            .with("de_DE/x.prop", "rtl=false")
            .with("en_US/x.prop", "rtl=false"),
    );
    let chain = LocaleFolderChain::builder()
        .locale("de_DE")
        .available_locales(Vec::new())
        .build()
        .unwrap();
    let bundle = bundle(resolver, chain);
    bundle.add_localized_source("x.prop", Priority::Highest).unwrap();
    assert_eq!(bundle.get_localized("rtl", &BoolReader).unwrap(), Some(false));
}
