use diabetes_inferences::InferenceModel;
use std::path::PathBuf;

pub fn fixture_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../inferences/tests/fixtures/diabetes_xgb.json")
}

pub fn fixture_model() -> InferenceModel {
    InferenceModel::load(fixture_model_path()).expect("fixture model loads")
}
