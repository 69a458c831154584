pub mod meeting_service;
