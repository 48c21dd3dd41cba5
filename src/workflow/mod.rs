pub mod flow_state;
pub mod linkedin;
pub mod upload_flow;

pub use flow_state::FlowState;
pub use linkedin::LinkedInFlow;
pub use upload_flow::UploadFlow;
