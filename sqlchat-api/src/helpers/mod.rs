pub mod dto;
pub mod html;
