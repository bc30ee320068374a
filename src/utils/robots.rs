use std::collections::HashMap;

/// Allow/disallow path prefixes for one user-agent group.
#[derive(Debug, Clone, Default)]
struct Rules {
    allow: Vec<String>,
    disallow: Vec<String>,
}

/// Just enough of robots.txt to answer "may this user agent fetch this path".
#[derive(Debug, Clone, Default)]
pub struct RobotsTxt {
    groups: HashMap<String, Rules>,
}

impl RobotsTxt {
    pub fn parse(content: &str) -> Self {
        let mut robots = Self::default();
        let mut agents: Vec<String> = Vec::new();
        let mut in_rules = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((directive, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match directive.trim().to_lowercase().as_str() {
                "user-agent" => {
                    // Consecutive user-agent lines share the group that follows them.
                    if in_rules {
                        agents.clear();
                        in_rules = false;
                    }
                    let agent = value.to_lowercase();
                    robots.groups.entry(agent.clone()).or_default();
                    agents.push(agent);
                }
                "allow" | "disallow" if !agents.is_empty() => {
                    in_rules = true;
                    if value.is_empty() {
                        continue;
                    }
                    let allow = directive.trim().eq_ignore_ascii_case("allow");
                    for agent in &agents {
                        let rules = robots.groups.entry(agent.clone()).or_default();
                        if allow {
                            rules.allow.push(value.to_string());
                        } else {
                            rules.disallow.push(value.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        robots
    }

    /// The longest matching rule decides; on a tie `Allow` wins.
    pub fn is_allowed(&self, user_agent: &str, path: &str) -> bool {
        let Some(rules) = self.rules_for(user_agent) else {
            return true;
        };

        let longest = |prefixes: &[String]| {
            prefixes
                .iter()
                .filter(|prefix| path.starts_with(prefix.as_str()))
                .map(String::len)
                .max()
        };

        match (longest(&rules.allow), longest(&rules.disallow)) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(allow), Some(disallow)) => allow >= disallow,
        }
    }

    fn rules_for(&self, user_agent: &str) -> Option<&Rules> {
        let agent = user_agent.to_lowercase();
        self.groups
            .iter()
            .filter(|(name, _)| name.as_str() != "*" && agent.contains(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, rules)| rules)
            .or_else(|| self.groups.get("*"))
    }
}
