use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::transport::{Transport, TransportError};

// An in-memory stand-in for a WebEx site.
//
// It answers the four meeting operations the way the XML API does, keyed off
// the bodyContent type of each request.
pub struct FakeWebExSite {
    meetings: Mutex<HashMap<String, String>>, // meeting key -> request body
    requests: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    offline: bool,
    latency: Option<Duration>,
}

impl FakeWebExSite {
    pub fn new() -> Self {
        Self {
            meetings: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            offline: false,
            latency: None,
        }
    }

    // A site that refuses every connection
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    // A site that takes `latency` to answer each request
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn has_meeting(&self, meeting_key: &str) -> bool {
        self.meetings.lock().unwrap().contains_key(meeting_key)
    }

    pub fn last_request(&self) -> Option<String> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn handle(&self, request: &str) -> String {
        if request.contains("binding.meeting.CreateMeeting") {
            let meeting_key = rand::random::<u32>().saturating_add(1).to_string();
            self.meetings
                .lock()
                .unwrap()
                .insert(meeting_key.clone(), request.to_string());
            return success_response(&format!(
                "<meet:meetingkey>{key}</meet:meetingkey>{urls}",
                key = meeting_key,
                urls = calendar_urls(&meeting_key)
            ));
        }

        if request.contains("binding.meeting.SetMeeting") {
            let Some(key) = tag_value(request, "meetingkey") else {
                return failure_response("Corresponding Meeting not found");
            };
            let mut meetings = self.meetings.lock().unwrap();
            return match meetings.get_mut(&key) {
                Some(stored) => {
                    *stored = request.to_string();
                    success_response(&calendar_urls(&key))
                }
                None => failure_response("Corresponding Meeting not found"),
            };
        }

        if request.contains("binding.meeting.DelMeeting") {
            let removed = tag_value(request, "meetingKey")
                .and_then(|key| self.meetings.lock().unwrap().remove(&key));
            return match removed {
                Some(_) => success_response("<ep:iCalendarURL/>"),
                None => failure_response("Corresponding Meeting not found"),
            };
        }

        if request.contains("binding.meeting.LstsummaryMeeting") {
            let meetings = self.meetings.lock().unwrap();
            let entries: String = meetings
                .keys()
                .map(|key| format!("<meet:meeting><meet:meetingKey>{}</meet:meetingKey></meet:meeting>", key))
                .collect();
            return success_response(&format!(
                "<meet:matchingRecords><meet:total>{}</meet:total></meet:matchingRecords>{}",
                meetings.len(),
                entries
            ));
        }

        failure_response("Unknown request")
    }
}

#[async_trait]
impl Transport for FakeWebExSite {
    async fn send(&self, request_xml: &str) -> Result<String, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request_xml.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline {
            return Err(TransportError::Network("connection refused".to_string()));
        }

        Ok(self.handle(request_xml))
    }
}

#[async_trait]
impl<T: Transport> Transport for Arc<T> {
    async fn send(&self, request_xml: &str) -> Result<String, TransportError> {
        self.as_ref().send(request_xml).await
    }
}

fn calendar_urls(meeting_key: &str) -> String {
    format!(
        "<meet:iCalendarURL><serv:host>https://acme.webex.com/acme/j.php?MTID=h{key}</serv:host>\
         <serv:attendee>https://acme.webex.com/acme/j.php?MTID=a{key}</serv:attendee></meet:iCalendarURL>",
        key = meeting_key
    )
}

pub fn success_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><serv:message xmlns:serv=\"http://www.webex.com/schemas/2002/06/service\">\
         <serv:header><serv:response><serv:result>SUCCESS</serv:result><serv:gsbStatus>PRIMARY</serv:gsbStatus>\
         </serv:response></serv:header><serv:body><serv:bodyContent>{}</serv:bodyContent></serv:body></serv:message>",
        body
    )
}

pub fn failure_response(reason: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><serv:message xmlns:serv=\"http://www.webex.com/schemas/2002/06/service\">\
         <serv:header><serv:response><serv:result>FAILURE</serv:result><serv:reason>{}</serv:reason>\
         <serv:gsbStatus>PRIMARY</serv:gsbStatus><serv:exceptionID>060001</serv:exceptionID>\
         </serv:response></serv:header><serv:body><serv:bodyContent/></serv:body></serv:message>",
        reason
    )
}

fn tag_value(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    Some(xml[start..end].to_string())
}
