use proofgen_core::config::{ProofGenConfig, THEORY_ENV};

// The only test in this binary touching the environment.
#[test]
fn load_applies_the_theory_override_from_the_environment() {
    let toml = r#"
theory_name = "from_file"
generate_axioms = false
"#;

    unsafe { std::env::remove_var(THEORY_ENV) };
    let cfg = ProofGenConfig::load(toml).expect("load");
    assert_eq!(cfg.theory_name, "from_file");

    unsafe { std::env::set_var(THEORY_ENV, "from_env") };
    let cfg = ProofGenConfig::load(toml).expect("load");
    assert_eq!(cfg.theory_name, "from_env");
    assert!(!cfg.generate_axioms);

    unsafe { std::env::set_var(THEORY_ENV, "") };
    let cfg = ProofGenConfig::load(toml).expect("load");
    assert_eq!(cfg.theory_name, "from_file");

    unsafe { std::env::remove_var(THEORY_ENV) };
    assert!(ProofGenConfig::load("theory_name = \"\"").is_err());
}
