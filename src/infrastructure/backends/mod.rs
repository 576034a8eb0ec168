pub mod claude;
pub mod openai;

use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> BackendBox {
        match name {
            BackendName::OpenAI => return Box::<openai::OpenAI>::default(),
            BackendName::Claude => return Box::<claude::Claude>::default(),
        }
    }
}
