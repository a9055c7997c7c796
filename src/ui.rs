const NAV_ITEMS: [(&str, &str); 4] = [
    ("dashboard", "Dashboard"),
    ("visits", "Patient Visits"),
    ("appointments", "Appointments"),
    ("settings", "Settings"),
];

pub fn render_shell() -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(page, title)| {
            format!(r##"<a href="#{page}" data-page="{page}" class="nav-item" title="{title}">{title}</a>"##)
        })
        .collect();
    SHELL_HTML.replace("{{NAV}}", &nav)
}

const SHELL_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Helix EMR</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --panel: #ffffff;
      --ink: #0f1724;
      --muted: #6b7280;
      --accent: #2563eb;
      --shadow: 0 6px 14px rgba(15, 23, 36, 0.06);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      display: grid;
      grid-template-columns: 200px 1fr;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    .sidebar {
      background: var(--panel);
      box-shadow: var(--shadow);
      padding: 24px 12px;
      display: flex;
      flex-direction: column;
      gap: 8px;
    }

    .nav-item {
      padding: 10px 12px;
      border-radius: 10px;
      color: var(--muted);
      text-decoration: none;
    }

    .nav-item.active {
      background: var(--accent);
      color: #fff;
    }

    main {
      padding: 28px;
      display: grid;
      gap: 18px;
      align-content: start;
    }

    #spa-content {
      transition: opacity 0.2s ease;
    }

    .muted,
    .placeholder {
      color: var(--muted);
    }

    .placeholder {
      padding: 20px;
      text-align: center;
    }

    .btn {
      border: 0;
      border-radius: 10px;
      padding: 10px;
      background: var(--panel);
      box-shadow: var(--shadow);
      cursor: pointer;
    }

    .slot-booked {
      border-left: 4px solid var(--accent);
    }

    .status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .status[data-type='error'] {
      color: #b91c1c;
    }
  </style>
</head>
<body>
  <aside class="sidebar" aria-label="Main">
    <strong>Helix EMR</strong>
    <nav class="nav">{{NAV}}</nav>
    <button class="btn" id="logout-btn" type="button">Logout</button>
  </aside>
  <main>
    <h1 id="page-title">Dashboard</h1>
    <div class="status" id="status"></div>
    <section id="spa-content"></section>
  </main>

  <script>
    const content = document.getElementById('spa-content');
    const titleEl = document.getElementById('page-title');
    const statusEl = document.getElementById('status');
    let selectedSlot = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body || {})
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const apply = (nav) => {
      if (nav.outcome === 'redirect') {
        window.location.href = nav.redirect;
        return;
      }
      if (nav.outcome === 'placeholder') {
        content.innerHTML = nav.html;
        return;
      }
      if (nav.outcome !== 'rendered') {
        return;
      }
      content.innerHTML = nav.html;
      document.title = nav.title;
      titleEl.textContent = nav.heading;
      document.querySelectorAll('.nav a').forEach((link) => {
        link.classList.toggle('active', link.dataset.page === nav.active);
      });
      if (nav.history_url) {
        window.history.pushState({ page: nav.page }, nav.title, nav.history_url);
      }
    };

    const navigate = (page) =>
      post('/api/navigate', { page, push_history: true }).then(apply);

    const updatePage = (changes) => post('/api/page/state', changes).then(apply);

    const fail = (err) => setStatus(err.message, 'error');

    document.addEventListener('click', (event) => {
      const navLink = event.target.closest('.nav a');
      if (navLink) {
        event.preventDefault();
        navigate(navLink.dataset.page).catch(fail);
        return;
      }

      const patientLink = event.target.closest('[data-patient]');
      if (patientLink) {
        event.preventDefault();
        updatePage({ patient: patientLink.dataset.patient })
          .then(() => navigate('patient'))
          .catch(fail);
        return;
      }

      const tab = event.target.closest('.appt-day-tab');
      if (tab) {
        updatePage({ offset: parseInt(tab.dataset.offset || '0', 10) }).catch(fail);
        return;
      }

      const slot = event.target.closest('[data-slot]');
      if (slot) {
        selectedSlot = { date: slot.dataset.date, time: slot.dataset.time };
        const query = new URLSearchParams({ ...selectedSlot, label: slot.dataset.label });
        fetch(`/api/slots/booking?${query}`)
          .then((res) => res.json())
          .then((existing) => {
            const form = document.getElementById('appt-form');
            if (!form) {
              return;
            }
            document.getElementById('appt-when').textContent =
              `${slot.dataset.label} — ${selectedSlot.date}`;
            form.elements.name.value = existing?.name || '';
            form.elements.mrn.value = existing?.mrn || '';
            form.elements.provider.value = existing?.provider || 'Dr. A. Kumar';
            form.elements.reason.value = existing?.reason || '';
            form.hidden = false;
          })
          .catch(fail);
      }
    });

    document.addEventListener('submit', (event) => {
      const form = event.target;
      if (form.id === 'appt-form') {
        event.preventDefault();
        if (!selectedSlot) {
          return;
        }
        const data = Object.fromEntries(new FormData(form));
        post('/api/appointments', { ...selectedSlot, ...data })
          .then(() => {
            form.hidden = true;
            setStatus('Saved', 'ok');
            return updatePage({});
          })
          .catch((err) => alert(err.message));
      } else if (form.id === 'soap-form') {
        event.preventDefault();
        post('/api/patient/soap', Object.fromEntries(new FormData(form)))
          .then(() => updatePage({}))
          .catch((err) => alert(err.message));
      }
    });

    document.addEventListener('change', (event) => {
      if (event.target.id === 'filter-visits') {
        updatePage({ filter: event.target.value }).catch(fail);
      }
    });

    document.getElementById('logout-btn').addEventListener('click', () => {
      post('/api/logout').then(() => setStatus('Logged out', 'ok')).catch(fail);
    });

    window.addEventListener('popstate', (event) => {
      const state = event.state ? event.state.page : null;
      post('/api/popstate', { state, fragment: window.location.hash }).then(apply).catch(fail);
    });

    post('/api/popstate', { fragment: window.location.hash }).then(apply).catch(fail);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_links_every_nav_page() {
        let html = render_shell();
        for (page, _) in NAV_ITEMS {
            assert!(html.contains(&format!(r#"data-page="{page}""#)));
        }
        assert!(html.contains(r#"id="spa-content""#));
        assert!(!html.contains("{{NAV}}"));
    }
}
