// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project roster: the contacts a workflow notifies and escalates to

use crate::notify::Channel;
use serde::{Deserialize, Serialize};

/// Role a contact plays on the launch team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Technician,
    Manager,
}

/// A reachable person on the launch team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_handle: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
            phone: None,
            email: None,
            chat_handle: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_chat_handle(mut self, handle: impl Into<String>) -> Self {
        self.chat_handle = Some(handle.into());
        self
    }

    /// Address to use for the given channel, if the contact has one.
    /// Chat falls back to the phone number (phone-number-addressed chat
    /// providers are the common case).
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Chat => self.chat_handle.as_deref().or(self.phone.as_deref()),
            Channel::Sms | Channel::Voice => self.phone.as_deref(),
            Channel::Email => self.email.as_deref(),
        }
    }
}

/// The set of contacts attached to a workflow instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    contacts: Vec<Contact>,
}

impl Roster {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn add(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// First manager on the roster, if any
    pub fn manager(&self) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.role == Role::Manager)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
