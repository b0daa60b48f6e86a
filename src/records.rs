use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Stop {
    pub stop_id: Option<u32>,
    pub stop_name: String,
    pub flow_bias: i32,
}

#[derive(Deserialize, Debug)]
pub struct RouteStop {
    pub origin: String,
    pub destination: String,
    pub stop_sequence: u32,
    pub stop_name: String,
}
