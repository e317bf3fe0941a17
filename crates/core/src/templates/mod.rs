mod attribute;
mod error;
mod ids;
mod mapping;
mod render;
mod request;

pub use attribute::{map_to_json, AttributeMap, AttributeValue};
pub use error::{Result, TemplateError};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use mapping::{
    request_template, response_template, RequestMapping, KEY_ATTRIBUTE, RESPONSE_PASSTHROUGH,
    TEMPLATE_VERSION,
};
pub use render::{render, TemplateContext};
pub use request::{DataSourceRequest, SUPPORTED_VERSIONS};
