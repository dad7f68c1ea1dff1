pub mod content_dto;
pub mod request;
pub mod response;
