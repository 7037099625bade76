use serde::Deserialize;

#[derive(Deserialize)]
pub struct ViewRequest {
    pub tel: Option<String>,
    pub semester: Option<String>,
}

#[derive(Deserialize)]
pub struct QueuesRequest {
    pub tel: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Deserialize)]
pub struct SemestersRequest {
    pub tel: Option<String>,
    pub semester: Option<String>,
}
