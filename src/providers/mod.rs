pub mod ayurveda;
pub mod fda;
pub mod geolocation;
pub mod memory;
pub mod openai;
pub mod overpass;
pub mod specialists;
