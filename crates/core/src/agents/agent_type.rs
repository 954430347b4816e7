//! Catalogue of known agent numbers.

use ah_protocol::agent_models::AgentDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    BusinessIntelligence,
    WebScraping,
    SocialMedia,
    Invoicing,
    Research,
    Publishing,
    SystemRules,
    SystemArchitecture,
    PasswordVault,
    PersonalDirectory,
}

impl AgentKind {
    pub const ALL: [AgentKind; 10] = [
        Self::BusinessIntelligence,
        Self::WebScraping,
        Self::SocialMedia,
        Self::Invoicing,
        Self::Research,
        Self::Publishing,
        Self::SystemRules,
        Self::SystemArchitecture,
        Self::PasswordVault,
        Self::PersonalDirectory,
    ];

    /// Look up a kind by its agent number.
    ///
    /// # Examples
    ///
    /// ```
    /// use ah_core::agents::AgentKind;
    ///
    /// assert_eq!(AgentKind::from_number(31), Some(AgentKind::SystemArchitecture));
    /// assert_eq!(AgentKind::from_number(2), None);
    /// ```
    pub fn from_number(agent_number: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.number() == agent_number)
    }

    pub fn number(self) -> u32 {
        match self {
            Self::BusinessIntelligence => 1,
            Self::WebScraping => 7,
            Self::SocialMedia => 8,
            Self::Invoicing => 15,
            Self::Research => 18,
            Self::Publishing => 29,
            Self::SystemRules => 30,
            Self::SystemArchitecture => 31,
            Self::PasswordVault => 32,
            Self::PersonalDirectory => 33,
        }
    }

    /// Display name, also used to address inter-agent messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::BusinessIntelligence => "Business Intelligence",
            Self::WebScraping => "Web Scraping",
            Self::SocialMedia => "Social Media",
            Self::Invoicing => "Invoicing",
            Self::Research => "Research",
            Self::Publishing => "Publishing",
            Self::SystemRules => "System Rules",
            Self::SystemArchitecture => "System Architecture",
            Self::PasswordVault => "Password Vault",
            Self::PersonalDirectory => "Personal Directory",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::BusinessIntelligence => {
                "Revenue tracking and financial analytics with Stripe integration"
            }
            Self::WebScraping => "Data extraction and web scraping with Apify integration",
            Self::SocialMedia => "Multi-platform social media content management",
            Self::Invoicing => "Automated invoice generation and delivery",
            Self::Research => "Data gathering and research report generation",
            Self::Publishing => "Content distribution across multiple platforms",
            Self::SystemRules => "Workflow automation and rule engine",
            Self::SystemArchitecture => "Real-time system visualization and monitoring",
            Self::PasswordVault => "Secure credential storage with biometric authentication",
            Self::PersonalDirectory => "Bookmarks, shortcuts, and personal organization",
        }
    }

    pub fn descriptor(self) -> AgentDescriptor {
        AgentDescriptor::new(self.number(), self.name(), self.description())
    }
}

/// Number of the agent kind carrying `name`, or 0 when unknown.
pub fn number_for_name(name: &str) -> u32 {
    AgentKind::ALL
        .into_iter()
        .find(|kind| kind.name() == name)
        .map_or(0, AgentKind::number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::from_number(kind.number()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_number() {
        assert_eq!(AgentKind::from_number(0), None);
        assert_eq!(AgentKind::from_number(34), None);
    }

    #[test]
    fn test_descriptor() {
        let descriptor = AgentKind::BusinessIntelligence.descriptor();
        assert_eq!(descriptor.agent_number, 1);
        assert_eq!(descriptor.name, "Business Intelligence");
        assert_eq!(
            descriptor.description,
            "Revenue tracking and financial analytics with Stripe integration"
        );
    }

    #[test]
    fn test_number_for_name() {
        assert_eq!(number_for_name("System Architecture"), 31);
        assert_eq!(number_for_name("Nobody"), 0);
    }
}
