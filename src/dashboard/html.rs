//! HTML page generation with D3.js charts

use crate::dashboard::charts::{Gauge, Heatmap, PolarityBar, ScoreBar};
use crate::dashboard::drilldown::{AdvisorSection, CallDetail, DrillDown};
use crate::dashboard::Dashboard;
use crate::error::LoadError;
use serde::Serialize;
use std::io::{self, Write};

/// The chart half of the dashboard, embedded in the page as a JS object
#[derive(Serialize)]
struct ChartData<'a> {
    score_bars: &'a [ScoreBar],
    heatmap: &'a Heatmap,
    polarity_gauge: &'a Gauge,
    subjectivity_gauge: &'a Gauge,
    polarity_bars: &'a [PolarityBar],
}

/// Render the page into a string
pub fn render(dashboard: &Dashboard, logo_src: &str) -> io::Result<String> {
    let mut buf = Vec::new();
    write(&mut buf, dashboard, logo_src)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write<W: Write>(writer: &mut W, dashboard: &Dashboard, logo_src: &str) -> io::Result<()> {
    let chart_data = ChartData {
        score_bars: &dashboard.score_bars,
        heatmap: &dashboard.heatmap,
        polarity_gauge: &dashboard.polarity_gauge,
        subjectivity_gauge: &dashboard.subjectivity_gauge,
        polarity_bars: &dashboard.polarity_bars,
    };
    let json_data = script_safe(&serde_json::to_string(&chart_data)?);

    write!(writer, r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>
        :root {{
            --bg: #ffffff;
            --card: #ffffff;
            --border: #e6e9ef;
            --text: #000000;
            --dim: #6b7280;
            --pass: #31a354;
            --fail: #d62728;
            --warn-bg: #fffbe6;
            --warn-border: #f5d565;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: Arial, Helvetica, sans-serif;
            font-size: 12px;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1600px; margin: 0 auto; padding: 2rem 3rem; }}

        /* Header: title takes four fifths, logo one fifth */
        .header {{
            display: grid;
            grid-template-columns: 4fr 1fr;
            align-items: center;
            margin-bottom: 2rem;
        }}
        .header h1 {{ font-size: 2.5rem; font-weight: 700; }}
        .header .logo {{ width: 200px; justify-self: end; }}

        h2 {{
            font-size: 1.6rem;
            font-weight: 600;
            margin: 2rem 0 1rem;
        }}
        .chart {{ width: 100%; }}
        #score-chart {{ height: 800px; }}
        #heatmap {{ height: 600px; }}
        #polarity-chart {{ height: 600px; }}

        .gauges {{
            display: grid;
            grid-template-columns: 1fr 1fr;
            gap: 2rem;
        }}
        .gauge {{ height: 380px; }}

        /* Drill-down */
        details.advisor {{
            border: 1px solid var(--border);
            border-radius: 8px;
            margin-bottom: 0.75rem;
            font-size: 1rem;
        }}
        details.advisor summary {{
            cursor: pointer;
            padding: 0.875rem 1rem;
            font-weight: 600;
        }}
        details.advisor[open] summary {{ border-bottom: 1px solid var(--border); }}
        .call {{ padding: 0.75rem 1.5rem 0; }}
        .call ul {{ margin: 0.5rem 0 0.5rem 1.5rem; }}
        .call code {{
            background: #f6f8fa;
            padding: 0.1rem 0.35rem;
            border-radius: 4px;
            font-family: 'SF Mono', 'Fira Code', monospace;
            color: #09ab3b;
        }}
        .call hr {{ border: none; border-top: 1px solid var(--border); margin: 1rem 0 0.25rem; }}
        .hint {{ color: var(--dim); font-size: 0.8rem; margin-left: 0.5rem; }}
        .warning {{
            background: var(--warn-bg);
            border: 1px solid var(--warn-border);
            border-radius: 8px;
            padding: 1rem;
            font-size: 1rem;
        }}

        /* Tooltip */
        .tooltip {{
            position: absolute;
            background: #ffffff;
            border: 1px solid var(--border);
            border-radius: 6px;
            padding: 0.5rem 0.75rem;
            font-size: 0.8rem;
            pointer-events: none;
            opacity: 0;
            transition: opacity 0.15s;
            z-index: 1000;
            box-shadow: 0 4px 12px rgba(0,0,0,0.15);
        }}
        .tooltip.visible {{ opacity: 1; }}

        .footer {{
            margin-top: 2rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            color: var(--dim);
            text-align: center;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{title}</h1>
            <img class="logo" src="{logo_src}" alt="logo">
        </div>

        <h2>🎯 Puntaje Promedio Total por Asesor</h2>
        <div class="chart" id="score-chart"></div>

        <h2>🔍 Promedio de Conteo por Categoría y Asesor</h2>
        <div class="chart" id="heatmap"></div>

        <div class="gauges">
            <div>
                <h2>{polarity_title}</h2>
                <div class="gauge" id="polarity-gauge"></div>
            </div>
            <div>
                <h2>{subjectivity_title}</h2>
                <div class="gauge" id="subjectivity-gauge"></div>
            </div>
        </div>

        <h2>📊 Promedio de Polaridad por Asesor (CUN)</h2>
        <div class="chart" id="polarity-chart"></div>

        <h2>🗂️ Análisis Detallado por Asesor</h2>
        <div id="drilldown">
{drilldown}
        </div>

        <div class="footer">Generado: {generated}</div>
    </div>

    <div class="tooltip" id="tooltip"></div>

    <script>
    const data = {json_data};

    const axisFont = {{ size: '14px', color: 'black', family: 'Arial' }};

    function styleAxis(g) {{
        g.selectAll('text')
            .style('font-size', axisFont.size)
            .style('fill', axisFont.color)
            .style('font-family', axisFont.family);
    }}

    // Ranked advisor score bars
    function drawScoreChart() {{
        const bars = data.score_bars;
        const container = document.getElementById('score-chart');
        const margin = {{ top: 40, right: 20, bottom: 140, left: 70 }};
        const width = container.clientWidth - margin.left - margin.right;
        const height = container.clientHeight - margin.top - margin.bottom;

        const svg = d3.select('#score-chart')
            .append('svg')
            .attr('width', width + margin.left + margin.right)
            .attr('height', height + margin.top + margin.bottom)
            .append('g')
            .attr('transform', `translate(${{margin.left}},${{margin.top}})`);

        // Bands are keyed by position so advisors sharing a name keep separate bars
        const x = d3.scaleBand()
            .domain(d3.range(bars.length))
            .range([0, width])
            .padding(0.2);

        const top = Math.max(d3.max(bars, d => d.value) || 0, 0) * 1.1 || 1;
        const bottom = Math.min(d3.min(bars, d => d.value) || 0, 0);
        const v = d => d.value ?? 0;
        const y = d3.scaleLinear()
            .domain([bottom, top])
            .nice()
            .range([height, 0]);

        svg.append('g')
            .call(d3.axisLeft(y).tickSize(-width).tickFormat(''))
            .style('stroke-dasharray', '3,3')
            .style('stroke-opacity', 0.15);

        svg.selectAll('.bar')
            .data(bars)
            .enter()
            .append('rect')
            .attr('class', 'bar')
            .attr('x', (d, i) => x(i))
            .attr('width', x.bandwidth())
            .attr('y', d => y(Math.max(v(d), 0)))
            .attr('height', d => Math.abs(y(v(d)) - y(0)))
            .attr('fill', d => d.color ?? 'none')
            .on('mouseover', (event, d) => showTooltip(event, [`Asesor: ${{d.asesor}}`, `Puntaje Promedio: ${{d.label}}`]))
            .on('mouseout', hideTooltip);

        svg.selectAll('.bar-label')
            .data(bars)
            .enter()
            .append('text')
            .attr('x', (d, i) => x(i) + x.bandwidth() / 2)
            .attr('y', d => y(Math.max(v(d), 0)) - 6)
            .attr('text-anchor', 'middle')
            .style('font-size', '12px')
            .text(d => d.label);

        svg.append('g')
            .call(d3.axisLeft(y).ticks(8).tickFormat(d3.format('.0%')))
            .call(styleAxis);

        svg.append('g')
            .attr('transform', `translate(0,${{height}})`)
            .call(d3.axisBottom(x).tickFormat(i => bars[i].asesor))
            .call(styleAxis)
            .selectAll('text')
            .attr('transform', 'rotate(-35)')
            .style('text-anchor', 'end');

        svg.append('text')
            .attr('transform', 'rotate(-90)')
            .attr('x', -height / 2)
            .attr('y', -55)
            .attr('text-anchor', 'middle')
            .text('Puntaje Promedio');

        svg.append('text')
            .attr('x', width / 2)
            .attr('y', height + margin.bottom - 10)
            .attr('text-anchor', 'middle')
            .text('Asesor');
    }}

    // Advisor x category heatmap; absent cells stay blank
    function drawHeatmap() {{
        const hm = data.heatmap;
        const container = document.getElementById('heatmap');
        const margin = {{ top: 20, right: 120, bottom: 60, left: 180 }};
        const width = container.clientWidth - margin.left - margin.right;
        const height = container.clientHeight - margin.top - margin.bottom;

        const root = d3.select('#heatmap')
            .append('svg')
            .attr('width', width + margin.left + margin.right)
            .attr('height', height + margin.top + margin.bottom);
        const svg = root.append('g')
            .attr('transform', `translate(${{margin.left}},${{margin.top}})`);

        const x = d3.scaleBand().domain(hm.categories).range([0, width]).padding(0.02);
        const y = d3.scaleBand().domain(hm.advisors).range([0, height]).padding(0.02);

        const cells = [];
        hm.advisors.forEach((asesor, i) => {{
            hm.categories.forEach((categoria, j) => {{
                const value = hm.cells[i][j];
                if (value !== null) {{
                    cells.push({{ asesor, categoria, color: hm.colors[i][j], hover: hm.hover[i][j] }});
                }}
            }});
        }});

        svg.selectAll('.cell')
            .data(cells)
            .enter()
            .append('rect')
            .attr('class', 'cell')
            .attr('x', d => x(d.categoria))
            .attr('y', d => y(d.asesor))
            .attr('width', x.bandwidth())
            .attr('height', y.bandwidth())
            .attr('fill', d => d.color)
            .on('mouseover', (event, d) => showTooltip(event, d.hover.split('\n')))
            .on('mouseout', hideTooltip);

        svg.append('g')
            .attr('transform', `translate(0,${{height}})`)
            .call(d3.axisBottom(x))
            .call(styleAxis);

        svg.append('g')
            .call(d3.axisLeft(y))
            .call(styleAxis);

        // Color bar over the fixed domain
        const barHeight = height * 0.8;
        const gradient = root.append('defs')
            .append('linearGradient')
            .attr('id', 'heat-gradient')
            .attr('x1', '0%').attr('x2', '0%')
            .attr('y1', '100%').attr('y2', '0%');
        hm.scale.forEach(([offset, color]) => {{
            gradient.append('stop').attr('offset', `${{offset * 100}}%`).attr('stop-color', color);
        }});

        const legend = root.append('g')
            .attr('transform', `translate(${{margin.left + width + 30}},${{margin.top + (height - barHeight) / 2}})`);
        legend.append('rect')
            .attr('width', 16)
            .attr('height', barHeight)
            .attr('fill', 'url(#heat-gradient)');
        legend.append('g')
            .attr('transform', 'translate(16,0)')
            .call(d3.axisRight(d3.scaleLinear().domain([hm.zmin, hm.zmax]).range([barHeight, 0])).ticks(4));
        legend.append('text')
            .attr('y', -8)
            .text('Conteo Promedio');
    }}

    // Semicircular gauge with colored bands, value bar and threshold marker
    function drawGauge(id, g) {{
        const container = document.getElementById(id);
        const width = container.clientWidth;
        const radius = Math.min(width / 2, container.clientHeight * 0.7) - 10;

        const svg = d3.select('#' + id)
            .append('svg')
            .attr('width', width)
            .attr('height', container.clientHeight)
            .append('g')
            .attr('transform', `translate(${{width / 2}},${{radius + 10}})`);

        const angle = d3.scaleLinear()
            .domain([g.min, g.max])
            .range([-Math.PI / 2, Math.PI / 2])
            .clamp(true);
        const inner = radius * 0.6;

        const band = d3.arc().innerRadius(inner).outerRadius(radius);
        g.bands.forEach(b => {{
            svg.append('path')
                .attr('d', band({{ startAngle: angle(b.from), endAngle: angle(b.to) }}))
                .attr('fill', b.color);
        }});

        if (g.value !== null) {{
            const depth = radius - inner;
            const bar = d3.arc()
                .innerRadius(inner + depth * 0.25)
                .outerRadius(radius - depth * 0.25);
            svg.append('path')
                .attr('d', bar({{ startAngle: angle(g.min), endAngle: angle(g.value) }}))
                .attr('fill', g.bar_color);

            const a = angle(g.value);
            const half = depth * g.threshold_thickness / 2;
            const mid = (inner + radius) / 2;
            svg.append('line')
                .attr('x1', Math.sin(a) * (mid - half))
                .attr('y1', -Math.cos(a) * (mid - half))
                .attr('x2', Math.sin(a) * (mid + half))
                .attr('y2', -Math.cos(a) * (mid + half))
                .attr('stroke', g.threshold_color)
                .attr('stroke-width', g.threshold_width);
        }}

        const ticks = angle.ticks(5);
        ticks.forEach(t => {{
            const a = angle(t);
            svg.append('text')
                .attr('x', Math.sin(a) * (radius + 4))
                .attr('y', -Math.cos(a) * (radius + 4))
                .attr('text-anchor', a < -0.1 ? 'end' : a > 0.1 ? 'start' : 'middle')
                .style('font-size', '11px')
                .text(t);
        }});

        svg.append('text')
            .attr('text-anchor', 'middle')
            .attr('y', -4)
            .style('font-size', '2.6rem')
            .text(g.value_label);

        if (g.delta !== null) {{
            svg.append('text')
                .attr('text-anchor', 'middle')
                .attr('y', 30)
                .style('font-size', '1.3rem')
                .style('fill', g.delta > 0 ? '#3d9970' : g.delta < 0 ? '#ff4136' : 'black')
                .text(g.delta_label);
        }}
    }}

    // Horizontal polarity bars in input order
    function drawPolarityChart() {{
        const bars = data.polarity_bars;
        const container = document.getElementById('polarity-chart');
        const margin = {{ top: 20, right: 60, bottom: 50, left: 180 }};
        const width = container.clientWidth - margin.left - margin.right;
        const height = container.clientHeight - margin.top - margin.bottom;

        const svg = d3.select('#polarity-chart')
            .append('svg')
            .attr('width', width + margin.left + margin.right)
            .attr('height', height + margin.top + margin.bottom)
            .append('g')
            .attr('transform', `translate(${{margin.left}},${{margin.top}})`);

        const lo = Math.min(d3.min(bars, d => d.value) || 0, 0);
        const hi = Math.max(d3.max(bars, d => d.value) || 0, 0);
        const pad = (hi - lo) * 0.15 || 0.1;
        const x = d3.scaleLinear()
            .domain([lo < 0 ? lo - pad : 0, hi + pad])
            .range([0, width]);
        const y = d3.scaleBand()
            .domain(d3.range(bars.length))
            .range([0, height])
            .padding(0.2);
        const v = d => d.value ?? 0;

        svg.selectAll('.bar')
            .data(bars)
            .enter()
            .append('rect')
            .attr('class', 'bar')
            .attr('x', d => x(Math.min(v(d), 0)))
            .attr('y', (d, i) => y(i))
            .attr('width', d => Math.abs(x(v(d)) - x(0)))
            .attr('height', y.bandwidth())
            .attr('fill', d => d.color ?? 'none')
            .on('mouseover', (event, d) => showTooltip(event, [`Asesor: ${{d.asesor}}`, `Polaridad: ${{d.label}}`]))
            .on('mouseout', hideTooltip);

        svg.selectAll('.bar-label')
            .data(bars)
            .enter()
            .append('text')
            .attr('x', d => v(d) >= 0 ? x(v(d)) + 4 : x(v(d)) - 4)
            .attr('y', (d, i) => y(i) + y.bandwidth() / 2)
            .attr('dy', '0.35em')
            .attr('text-anchor', d => v(d) >= 0 ? 'start' : 'end')
            .style('font-size', '10px')
            .text(d => d.label);

        svg.append('g')
            .attr('transform', `translate(${{x(0)}},0)`)
            .call(d3.axisLeft(y).tickSize(0).tickFormat(i => bars[i].asesor))
            .call(styleAxis);

        svg.append('g')
            .attr('transform', `translate(0,${{height}})`)
            .call(d3.axisBottom(x).ticks(6));

        svg.append('text')
            .attr('x', width / 2)
            .attr('y', height + 40)
            .attr('text-anchor', 'middle')
            .text('Polaridad');
    }}

    // Tooltip
    function showTooltip(event, lines) {{
        const tooltip = document.getElementById('tooltip');
        tooltip.replaceChildren(...lines.map(line => {{
            const div = document.createElement('div');
            div.textContent = line;
            return div;
        }}));
        tooltip.classList.add('visible');
        tooltip.style.left = (event.pageX + 10) + 'px';
        tooltip.style.top = (event.pageY - 10) + 'px';
    }}

    function hideTooltip() {{
        document.getElementById('tooltip').classList.remove('visible');
    }}

    // Initialize
    drawScoreChart();
    drawHeatmap();
    drawGauge('polarity-gauge', data.polarity_gauge);
    drawGauge('subjectivity-gauge', data.subjectivity_gauge);
    drawPolarityChart();
    </script>
</body>
</html>
"#,
        title = escape_html(&dashboard.title),
        logo_src = escape_html(logo_src),
        polarity_title = escape_html(&dashboard.polarity_gauge.title),
        subjectivity_title = escape_html(&dashboard.subjectivity_gauge.title),
        drilldown = render_drilldown(&dashboard.drilldown),
        generated = escape_html(&dashboard.generated),
        json_data = json_data
    )?;

    Ok(())
}

/// Minimal page shown when a render pass fails
pub fn write_error_page<W: Write>(writer: &mut W, err: &LoadError) -> io::Result<()> {
    write!(writer, r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <title>Dashboard no disponible</title>
    <style>
        body {{ font-family: Arial, Helvetica, sans-serif; margin: 3rem; }}
        pre {{ background: #fff0f0; border: 1px solid #f5b5b5; border-radius: 8px; padding: 1rem; white-space: pre-wrap; }}
    </style>
</head>
<body>
    <h1>No se pudo generar el dashboard</h1>
    <pre>{}</pre>
</body>
</html>
"#,
        escape_html(&err.to_string())
    )
}

fn render_drilldown(drilldown: &DrillDown) -> String {
    match drilldown {
        DrillDown::Empty { warning } => {
            format!(r#"            <div class="warning">⚠️ {}</div>"#, escape_html(warning))
        }
        DrillDown::Sections { sections } => sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_section(section: &AdvisorSection) -> String {
    let calls: Vec<String> = section.calls.iter().map(render_call).collect();
    format!(
        r#"            <details class="advisor">
                <summary>{}</summary>
{}
            </details>"#,
        escape_html(&section.title()),
        calls.join("\n")
    )
}

fn render_call(call: &CallDetail) -> String {
    let checks: Vec<String> = call
        .checks
        .iter()
        .map(|c| {
            format!(
                r#"                        <li>{}<span class="hint">{}</span></li>"#,
                escape_html(&c.text()),
                escape_html(&c.hint())
            )
        })
        .collect();

    format!(
        r#"                <div class="call">
                    <p>📄 Archivo: <code>{archivo}</code></p>
                    <ul>
{checks}
                    </ul>
                    <p>🎯 {result}</p>
                    <hr>
                </div>"#,
        archivo = escape_html(&call.archivo),
        checks = checks.join("\n"),
        result = escape_html(&call.result_text())
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep embedded JSON from closing the surrounding script tag
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
