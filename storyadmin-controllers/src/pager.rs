use storyadmin_common::utils::IntoReadable as _;

/// Pagination control of a list screen: previous, numbered pages with the
/// gaps folded into `..`, next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pager {
    pub prev: Link,
    pub parts: Vec<Link>,
    pub next: Link,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub state: LinkState,
    /// Page the link leads to, `None` for the gap marker
    pub page: Option<usize>,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Normal,
    Active,
    Disabled,
}

#[derive(Debug, PartialEq)]
enum Part {
    Num(bool, usize),
    Ellipse,
}

impl Pager {
    pub fn new(page: usize, pages: usize) -> Self {
        let (prev, parts, next) = Self::paginate(pages, page);

        Self { prev, parts, next }
    }

    fn paginate(pages: usize, page: usize) -> (Link, Vec<Link>, Link) {
        let mut buff = Vec::with_capacity(11);

        let prev = Link {
            state: if page <= 1 {
                LinkState::Disabled
            } else {
                LinkState::Normal
            },
            page: page.checked_sub(1).filter(|p| *p >= 1),
            text: "previous".into(),
        };

        for i in 1..=pages {
            if i == 1 || i == pages {
                buff.push(Part::Num(i == page, i));

                continue;
            }

            if (page.saturating_sub(1)..=page.saturating_add(1)).contains(&i) {
                buff.push(Part::Num(i == page, i));
            } else if let Some(l) = buff.last_mut() {
                if *l == Part::Ellipse {
                    continue;
                } else {
                    buff.push(Part::Ellipse);
                }
            }
        }

        let next = Link {
            state: if page >= pages {
                LinkState::Disabled
            } else {
                LinkState::Normal
            },
            page: (page < pages).then(|| page + 1),
            text: "next".into(),
        };

        let buff = buff
            .into_iter()
            .map(|part| match part {
                Part::Num(active, page) => Link {
                    state: if active {
                        LinkState::Active
                    } else {
                        LinkState::Normal
                    },
                    page: Some(page),
                    text: page.into_readable().to_string(),
                },
                Part::Ellipse => Link {
                    state: LinkState::Disabled,
                    page: None,
                    text: "..".into(),
                },
            })
            .collect::<Vec<_>>();

        (prev, buff, next)
    }

    /// Compact one-line rendering, `‹ 1 .. [5] 6 .. 12 ›`.
    pub fn render(&self) -> String {
        let mut out = Vec::with_capacity(self.parts.len() + 2);

        out.push(if self.prev.state == LinkState::Disabled { " " } else { "‹" }.to_string());

        for part in &self.parts {
            out.push(match part.state {
                LinkState::Active => format!("[{}]", part.text),
                _ => part.text.clone(),
            });
        }

        out.push(if self.next.state == LinkState::Disabled { " " } else { "›" }.to_string());

        out.join(" ").trim().to_string()
    }
}
